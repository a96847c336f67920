//! HTTP form of the bridge, for pages that cannot be handed a host function.
//!
//! `POST /bridge` takes a [`BridgeCall`](crate::bridge::BridgeCall) and answers with a
//! [`BridgeResponse`](crate::bridge::BridgeResponse) envelope. Every call must carry the server's
//! session token in the `X-Session-Token` header. `GET /health` is open.

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use serde_json::Value;
use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::bridge::Bridge;

/// Header carrying the session token.
pub const SESSION_TOKEN_HEADER: &str = "X-Session-Token";

#[derive(Debug)]
struct ServerState {
    bridge: Bridge,
    token: Arc<String>,
}

/// An HTTP server answering bridge calls on the loopback interface.
#[derive(Debug)]
pub struct BridgeServer {
    port: u16,
    bridge: Bridge,
    token: Arc<String>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl BridgeServer {
    /// Creates a server for `bridge`. Port `0` binds an ephemeral port on [`Self::start`].
    pub fn new(bridge: Bridge, port: u16) -> Self {
        Self {
            port,
            bridge,
            token: Arc::new(uuid::Uuid::new_v4().to_string()),
            shutdown_tx: None,
            handle: None,
        }
    }

    /// The bound port once started, the configured one before.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The token pages must send in the `X-Session-Token` header.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The URL of the bridge endpoint.
    pub fn url(&self) -> String {
        format!("http://{}:{}/bridge", Ipv4Addr::LOCALHOST, self.port)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Binds the listener and starts serving in the background.
    pub async fn start(&mut self) -> io::Result<()> {
        if self.is_running() {
            return Err(io::Error::new(io::ErrorKind::AddrInUse, "bridge server already running"));
        }

        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, self.port));
        let listener = TcpListener::bind(addr).await?;
        self.port = listener.local_addr()?.port();

        let state =
            Arc::new(ServerState { bridge: self.bridge.clone(), token: self.token.clone() });
        let router = build_router(state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let port = self.port;

        self.shutdown_tx = Some(shutdown_tx);
        self.handle = Some(tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(err) = server.await {
                error!(target: "mock_wallet::server", %err, "bridge server failed");
            }
            debug!(target: "mock_wallet::server", port, "bridge server stopped");
        }));

        info!(target: "mock_wallet::server", url = %self.url(), "bridge server listening");
        Ok(())
    }

    /// Stops the server and waits for in-flight calls to finish.
    pub async fn stop(&mut self) -> io::Result<()> {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.map_err(io::Error::other)?;
        }
        Ok(())
    }
}

fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/bridge", post(bridge_call))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session_token))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

async fn bridge_call(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<Value>,
) -> Json<Value> {
    Json(state.bridge.respond(payload).await.into_value())
}

async fn health() -> &'static str {
    "OK"
}

async fn require_session_token(
    State(state): State<Arc<ServerState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let ok = req
        .headers()
        .get(SESSION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == state.token.as_str());

    if !ok {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}

//! The single host entry point reachable from the page context.
//!
//! The page calls the bridge with a [`BridgeCall`] that carries its session id, and always gets a
//! [`BridgeResponse`] envelope back. The provider script turns an `error` envelope into a
//! rejected promise, so the envelope crosses the context boundary the same way whatever carries
//! it: an exposed page function, an in-process channel or the HTTP [`server`](crate::server).

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    error::{ProviderRpcError, WalletError},
    registry::{SessionId, SessionRegistry},
    session::{self, RpcRequest},
};

/// A host function taking the page's JSON payload and resolving to a response envelope.
pub type BridgeFn = Arc<dyn Fn(Value) -> BoxFuture<'static, Value> + Send + Sync>;

/// A provider request sent by the page, tagged with the session it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeCall {
    pub session_id: SessionId,
    pub method: String,
    /// Positional params or a single object, see [`RpcRequest::params`].
    #[serde(default = "session::no_params", deserialize_with = "session::deserialize_params")]
    pub params: Value,
    /// Emit a trace record for this call.
    #[serde(default)]
    pub debug: bool,
}

impl BridgeCall {
    pub fn new(session_id: SessionId, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self { session_id, method: method.into(), params: Value::Array(params), debug: false }
    }
}

/// The outcome of a bridge call, as the page receives it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeResponse {
    Result(Value),
    Error(ProviderRpcError),
}

impl BridgeResponse {
    pub fn into_value(self) -> Value {
        match self {
            Self::Result(result) => json!({ "result": result }),
            Self::Error(error) => json!({ "error": error }),
        }
    }

    pub fn into_result(self) -> Result<Value, ProviderRpcError> {
        match self {
            Self::Result(result) => Ok(result),
            Self::Error(error) => Err(error),
        }
    }
}

impl From<Result<Value, WalletError>> for BridgeResponse {
    fn from(outcome: Result<Value, WalletError>) -> Self {
        match outcome {
            Ok(result) => Self::Result(result),
            Err(err) => Self::Error(err.to_rpc_error()),
        }
    }
}

/// A bridge call travelling over a channel, with the slot its response goes to.
#[derive(Debug)]
pub struct BridgeMessage {
    pub call: BridgeCall,
    pub reply: oneshot::Sender<BridgeResponse>,
}

impl BridgeMessage {
    pub fn new(call: BridgeCall) -> (Self, oneshot::Receiver<BridgeResponse>) {
        let (reply, rx) = oneshot::channel();
        (Self { call, reply }, rx)
    }
}

/// Routes page calls to the session they belong to.
///
/// This type is cheap to clone and can be used concurrently.
#[derive(Clone, Debug)]
pub struct Bridge {
    registry: SessionRegistry,
}

impl Bridge {
    pub fn new(registry: SessionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Looks up the call's session and awaits its dispatch.
    ///
    /// The outcome is returned unchanged. With `debug` set, a record of the call and its outcome
    /// is emitted on the `mock_wallet::bridge` target first.
    pub async fn call(&self, call: BridgeCall) -> Result<Value, WalletError> {
        let BridgeCall { session_id, method, params, debug } = call;
        let session = self.registry.lookup(&session_id)?;

        let logged_params = debug.then(|| params.clone());
        let outcome = session.dispatch(RpcRequest::with_params(method.clone(), params)).await;

        if let Some(params) = logged_params {
            let wallet = session_id.short();
            match &outcome {
                Ok(result) => info!(
                    target: "mock_wallet::bridge",
                    wallet,
                    %method,
                    %params,
                    %result,
                    "WALLET REQUEST"
                ),
                Err(error) => info!(
                    target: "mock_wallet::bridge",
                    wallet,
                    %method,
                    %params,
                    %error,
                    "WALLET REQUEST"
                ),
            }
        }
        outcome
    }

    /// Decodes a raw page payload, performs the call and wraps the outcome in an envelope.
    pub async fn respond(&self, payload: Value) -> BridgeResponse {
        match serde_json::from_value::<BridgeCall>(payload) {
            Ok(call) => self.call(call).await.into(),
            Err(err) => BridgeResponse::from(Err(WalletError::invalid_request(format!(
                "malformed bridge payload: {err}"
            )))),
        }
    }

    /// The bridge as a host function, ready to be exposed to a page.
    pub fn handler(&self) -> BridgeFn {
        let bridge = self.clone();
        Arc::new(move |payload| {
            let bridge = bridge.clone();
            Box::pin(async move { bridge.respond(payload).await.into_value() })
        })
    }

    /// Serves calls arriving on `rx` until every sender is dropped.
    ///
    /// Each call runs on its own task, so a slow call never holds up calls to other sessions.
    pub fn serve_channel(&self, mut rx: mpsc::Receiver<BridgeMessage>) -> JoinHandle<()> {
        let bridge = self.clone();
        tokio::spawn(async move {
            while let Some(BridgeMessage { call, reply }) = rx.recv().await {
                let bridge = bridge.clone();
                tokio::spawn(async move {
                    let response = bridge.call(call).await.into();
                    // the caller may have gone away
                    let _ = reply.send(response);
                });
            }
            trace!(target: "mock_wallet::bridge", "bridge channel closed");
        })
    }

    /// Creates a channel of the given capacity and serves it, see [`Self::serve_channel`].
    pub fn spawn_channel(&self, buffer: usize) -> (mpsc::Sender<BridgeMessage>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, self.serve_channel(rx))
    }
}

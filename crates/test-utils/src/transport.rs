//! An in-process JSON-RPC transport that answers from scripted handlers.

use alloy_json_rpc::{
    ErrorPayload, RequestPacket, Response, ResponsePacket, ResponsePayload, SerializedRequest,
};
use alloy_primitives::{Bytes, hex, keccak256};
use alloy_provider::{DynProvider, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_transport::{TransportError, TransportFut};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::{Value, value::to_raw_value};
use std::{
    collections::HashMap,
    sync::Arc,
    task::{Context, Poll},
};

type Handler = Arc<dyn Fn(&Value) -> Result<Value, ErrorPayload> + Send + Sync>;

/// A call observed by a [`ScriptedTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
}

/// A transport that answers each request with the handler registered for its method.
///
/// Requests for unscripted methods fail with `-32601 method not found`. Every request is
/// recorded, so tests can assert on how many calls reached the "network".
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    handlers: Arc<RwLock<HashMap<String, Handler>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl std::fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedTransport")
            .field("methods", &self.handlers.read().keys().collect::<Vec<_>>())
            .field("calls", &self.calls.lock().len())
            .finish()
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `method`, replacing any previous one.
    pub fn on<F>(&self, method: &str, handler: F) -> &Self
    where
        F: Fn(&Value) -> Result<Value, ErrorPayload> + Send + Sync + 'static,
    {
        self.handlers.write().insert(method.to_string(), Arc::new(handler));
        self
    }

    /// Always answers `method` with `result`.
    pub fn on_result<T: Serialize>(&self, method: &str, result: T) -> &Self {
        let result = serde_json::to_value(result).expect("result serializes");
        self.on(method, move |_| Ok(result.clone()))
    }

    /// Always fails `method` with the given JSON-RPC error.
    pub fn on_error(&self, method: &str, code: i64, message: &'static str) -> &Self {
        self.on(method, move |_| Err(rpc_error(code, message)))
    }

    /// Answers `eth_sendRawTransaction` with the keccak hash of the submitted bytes, the same
    /// hash a node would report.
    pub fn hash_raw_transactions(&self) -> &Self {
        self.on("eth_sendRawTransaction", |params| {
            let raw = params
                .get(0)
                .and_then(Value::as_str)
                .and_then(|raw| hex::decode(raw).ok())
                .ok_or_else(|| rpc_error(-32602, "invalid params"))?;
            Ok(serde_json::to_value(keccak256(raw)).expect("hash serializes"))
        })
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// The payloads of every `eth_sendRawTransaction` received so far, in order.
    pub fn raw_transactions(&self) -> Vec<Bytes> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method == "eth_sendRawTransaction")
            .filter_map(|call| serde_json::from_value(call.params.get(0)?.clone()).ok())
            .collect()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of calls received for `method`.
    pub fn calls_to(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|call| call.method == method).count()
    }

    /// Wraps this transport in a type-erased provider.
    pub fn provider(&self) -> DynProvider {
        let client = RpcClient::new(self.clone(), true);
        let provider: RootProvider = RootProvider::new(client);
        DynProvider::new(provider)
    }

    fn respond(&self, request: &SerializedRequest) -> Response {
        let method = request.method().to_string();
        let params = request
            .params()
            .and_then(|raw| serde_json::from_str(raw.get()).ok())
            .unwrap_or(Value::Null);
        self.calls.lock().push(RecordedCall { method: method.clone(), params: params.clone() });

        let handler = self.handlers.read().get(&method).cloned();
        let payload = match handler {
            Some(handler) => match handler(&params) {
                Ok(result) => ResponsePayload::Success(
                    to_raw_value(&result).expect("scripted result serializes"),
                ),
                Err(err) => ResponsePayload::Failure(err),
            },
            None => ResponsePayload::Failure(rpc_error(-32601, "method not found")),
        };
        Response { id: request.id().clone(), payload }
    }
}

fn rpc_error(code: i64, message: &'static str) -> ErrorPayload {
    ErrorPayload { code, message: message.into(), data: None }
}

impl tower::Service<RequestPacket> for ScriptedTransport {
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = TransportFut<'static>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let response = match request {
            RequestPacket::Single(request) => ResponsePacket::Single(self.respond(&request)),
            RequestPacket::Batch(requests) => {
                ResponsePacket::Batch(requests.iter().map(|req| self.respond(req)).collect())
            }
        };
        Box::pin(async move { Ok(response) })
    }
}

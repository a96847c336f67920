use async_trait::async_trait;
use mock_wallet::{BridgeFn, BridgeResponse, InitScript, PageTarget, ProviderRpcError, SessionId};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;

/// A [`PageTarget`] standing in for a browser page.
///
/// It keeps what the wallet injects and calls the exposed bridge the way the provider script
/// does.
#[derive(Default)]
pub struct RecordingTarget {
    functions: Mutex<HashMap<String, BridgeFn>>,
    scripts: Mutex<Vec<InitScript>>,
}

#[async_trait]
impl PageTarget for RecordingTarget {
    async fn expose_function(&self, name: &str, function: BridgeFn) -> eyre::Result<()> {
        self.functions.lock().insert(name.to_string(), function);
        Ok(())
    }

    async fn add_init_script(&self, script: InitScript) -> eyre::Result<()> {
        self.scripts.lock().push(script);
        Ok(())
    }
}

impl RecordingTarget {
    pub fn scripts(&self) -> Vec<InitScript> {
        self.scripts.lock().clone()
    }

    pub fn exposed(&self) -> Vec<String> {
        self.functions.lock().keys().cloned().collect()
    }

    /// The session id baked into the last injected script.
    pub fn session_id(&self) -> SessionId {
        let scripts = self.scripts.lock();
        let script = scripts.last().expect("no script injected");
        serde_json::from_value(script.args["sessionId"].clone()).unwrap()
    }

    /// Sends `provider.request({ method, params })` from the page of the last installed wallet.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        let args = self.scripts.lock().last().expect("no script injected").args.clone();
        self.request_as(&args, method, params).await
    }

    /// Like [`Self::request`], for the wallet installed with the given script args.
    pub async fn request_as(
        &self,
        args: &Value,
        method: &str,
        params: Value,
    ) -> Result<Value, ProviderRpcError> {
        let name = args["bridge"]["name"].as_str().expect("not a binding bridge");
        let function = self.functions.lock().get(name).cloned().expect("bridge not exposed");
        let payload = json!({
            "sessionId": args["sessionId"],
            "method": method,
            "params": params,
            "debug": args["debug"],
        });
        let envelope = function(payload).await;
        serde_json::from_value::<BridgeResponse>(envelope).unwrap().into_result()
    }
}

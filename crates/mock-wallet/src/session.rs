//! A single installation of the wallet and its method dispatcher.

use alloy_primitives::{Address, Bytes, hex};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::{Value, json, value::to_raw_value};

use crate::{
    account::Account,
    chain::{self, ChainDescriptor, MAINNET},
    error::{ExecutionError, WalletError},
    method::WalletMethod,
    registry::SessionId,
    transport::Transports,
    tx,
};

/// An EIP-1193 request as the page sends it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    /// An array of positional params or a single object. Absent and `null` params are `[]`.
    #[serde(default = "no_params", deserialize_with = "deserialize_params")]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self::with_params(method, Value::Array(params))
    }

    /// A request with params as the page passed them, array or object.
    pub fn with_params(method: impl Into<String>, params: Value) -> Self {
        Self { method: method.into(), params }
    }

    /// The positional params. Object params have none.
    pub fn positional(&self) -> &[Value] {
        self.params.as_array().map(Vec::as_slice).unwrap_or_default()
    }
}

pub(crate) fn no_params() -> Value {
    Value::Array(Vec::new())
}

pub(crate) fn deserialize_params<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Value, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(no_params()),
        Some(params @ (Value::Array(_) | Value::Object(_))) => Ok(params),
        Some(other) => {
            Err(D::Error::custom(format!("params must be an array or an object, got {other}")))
        }
    }
}

/// The host-side state of one installed wallet.
///
/// The account is bound for the session's lifetime. The only mutable state is the current chain,
/// which changes on `wallet_switchEthereumChain` alone.
#[derive(Debug)]
pub struct WalletSession {
    id: SessionId,
    account: Account,
    default_chain: &'static ChainDescriptor,
    current_chain: RwLock<&'static ChainDescriptor>,
    transports: Transports,
}

impl WalletSession {
    pub fn builder(account: impl Into<Account>) -> WalletSessionBuilder {
        WalletSessionBuilder::new(account.into())
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn address(&self) -> Address {
        self.account.address()
    }

    pub fn default_chain(&self) -> &'static ChainDescriptor {
        self.default_chain
    }

    /// A snapshot of the chain the session is currently on.
    pub fn current_chain(&self) -> &'static ChainDescriptor {
        *self.current_chain.read()
    }

    /// Answers a provider request.
    ///
    /// Emulated methods are handled here. Every other method is forwarded verbatim to the
    /// transport of the current chain, and its result or error is passed through unchanged.
    ///
    /// Emulated methods read positional params only. Forwarded methods pass object params along
    /// as they are.
    pub async fn dispatch(&self, request: RpcRequest) -> Result<Value, WalletError> {
        let kind = WalletMethod::parse(&request.method);
        trace!(
            target: "mock_wallet::session",
            session = self.id.short(),
            method = %request.method,
            emulated = kind.is_emulated(),
            "dispatching request"
        );

        let params = request.positional();
        match kind {
            WalletMethod::Accounts | WalletMethod::RequestAccounts => {
                Ok(json!([self.account.address()]))
            }
            WalletMethod::RequestPermissions | WalletMethod::RevokePermissions => {
                Ok(json!([{ "parentCapability": "eth_accounts" }]))
            }
            WalletMethod::GetPermissions => Ok(json!([])),
            WalletMethod::SwitchChain => {
                self.switch_chain(params);
                Ok(Value::Null)
            }
            WalletMethod::PersonalSign => self.personal_sign(params).await,
            WalletMethod::SignTypedData => Err(WalletError::unsupported(request.method.as_str())),
            WalletMethod::SendTransaction => self.send_transaction(params).await,
            WalletMethod::ChainId => Ok(Value::String(self.current_chain().hex_id())),
            WalletMethod::Unknown(method) => self.forward(method, &request.params).await,
        }
    }

    /// Handler for `wallet_switchEthereumChain`.
    ///
    /// Always succeeds: ids that cannot be resolved select the session's default chain.
    fn switch_chain(&self, params: &[Value]) {
        let requested = params.first().and_then(|p| p.get("chainId")).and_then(Value::as_str);
        let chain = chain::resolve_or(requested, self.default_chain);
        *self.current_chain.write() = chain;
        debug!(
            target: "mock_wallet::session",
            session = self.id.short(),
            requested,
            chain = chain.name,
            "switched chain"
        );
    }

    /// Handler for `personal_sign`: `params` are `[message, address]`.
    async fn personal_sign(&self, params: &[Value]) -> Result<Value, WalletError> {
        if !self.account.can_sign() {
            return Err(WalletError::unsupported("personal_sign"));
        }

        let message = params
            .first()
            .cloned()
            .ok_or_else(|| WalletError::invalid_request("personal_sign: missing message"))?;
        let message: Bytes = serde_json::from_value(message).map_err(|err| {
            WalletError::invalid_request(format!("personal_sign: message must be hex: {err}"))
        })?;

        if let Some(address) = params.get(1).and_then(|v| v.as_str()) {
            match address.parse::<Address>() {
                Ok(address) if address == self.address() => {}
                _ => {
                    return Err(WalletError::invalid_request(format!(
                        "personal_sign: cannot sign for {address}"
                    )));
                }
            }
        }

        let signature = self.account.sign_message(&message).await?;
        Ok(Value::String(hex::encode_prefixed(signature.as_bytes())))
    }

    /// Handler for `eth_sendTransaction`: `params` are `[transaction]`.
    ///
    /// A transaction without `to` deploys its `data` as a contract.
    async fn send_transaction(&self, params: &[Value]) -> Result<Value, WalletError> {
        let request = params.first().cloned().ok_or_else(|| {
            WalletError::invalid_request("eth_sendTransaction: missing transaction")
        })?;
        let request: TransactionRequest = serde_json::from_value(request).map_err(|err| {
            WalletError::invalid_request(format!(
                "eth_sendTransaction: malformed transaction: {err}"
            ))
        })?;

        let address = self.address();
        match request.from {
            Some(from) if from == address => {}
            Some(from) => {
                return Err(WalletError::invalid_request(format!(
                    "Invalid from address: expected {address}, got {from}"
                )));
            }
            None => {
                return Err(WalletError::invalid_request(format!(
                    "Invalid from address: expected {address}, got none"
                )));
            }
        }

        let chain = self.current_chain();
        let provider = self.transports.get(chain)?;
        let hash = match self.account.network_wallet() {
            Some(wallet) => {
                tx::sign_and_submit(&provider, &wallet, address, request, chain.id).await?
            }
            None => tx::submit_to_node(&provider, request).await?,
        };
        debug!(
            target: "mock_wallet::session",
            session = self.id.short(),
            %hash,
            chain = chain.name,
            "sent transaction"
        );
        Ok(serde_json::to_value(hash).map_err(ExecutionError::from)?)
    }

    /// Sends a non-emulated method to the current chain's transport.
    async fn forward(&self, method: String, params: &Value) -> Result<Value, WalletError> {
        let provider = self.transports.get(self.current_chain())?;
        let params = to_raw_value(params).map_err(ExecutionError::from)?;
        let result = provider.raw_request_dyn(method.into(), &params).await?;
        Ok(serde_json::from_str(result.get()).map_err(ExecutionError::from)?)
    }
}

/// Builder for a [`WalletSession`].
#[derive(Debug)]
pub struct WalletSessionBuilder {
    id: Option<SessionId>,
    account: Account,
    default_chain: &'static ChainDescriptor,
    transports: Transports,
}

impl WalletSessionBuilder {
    fn new(account: Account) -> Self {
        Self { id: None, account, default_chain: &MAINNET, transports: Transports::new() }
    }

    /// Uses a fixed id instead of a random one.
    pub fn id(mut self, id: SessionId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the chain the session starts on and falls back to.
    ///
    /// Unknown ids keep mainnet.
    pub fn default_chain(mut self, chain_id: u64) -> Self {
        self.default_chain = chain::by_id(chain_id).unwrap_or(&MAINNET);
        self
    }

    pub fn transports(mut self, transports: Transports) -> Self {
        self.transports = transports;
        self
    }

    pub fn build(self) -> WalletSession {
        let Self { id, account, default_chain, transports } = self;
        WalletSession {
            id: id.unwrap_or_else(SessionId::random),
            account,
            default_chain,
            current_chain: RwLock::new(default_chain),
            transports,
        }
    }
}

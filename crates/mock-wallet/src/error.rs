use alloy_primitives::hex::FromHexError;
use alloy_signer_local::LocalSignerError;
use alloy_transport::TransportError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::SessionId;

/// EIP-1193 error code: the requested method is not supported.
pub const UNSUPPORTED_METHOD: i64 = 4200;
/// EIP-1193 error code: the provider is disconnected from all chains.
pub const DISCONNECTED: i64 = 4900;
/// JSON-RPC error code: invalid method parameters.
pub const INVALID_PARAMS: i64 = -32602;
/// JSON-RPC error code: internal error.
pub const INTERNAL_ERROR: i64 = -32603;

#[derive(Debug, thiserror::Error)]
pub enum PrivateKeyError {
    #[error("Failed to create wallet from private key. Private key is invalid hex: {0}")]
    InvalidHex(#[from] FromHexError),
    #[error(
        "Failed to create wallet from private key. Invalid private key. But env var {0} exists. Is the `$` anchor missing?"
    )]
    ExistsAsEnvVar(String),
    #[error("Failed to create wallet from private key: {0}")]
    InvalidKey(#[from] LocalSignerError),
}

/// Errors surfaced by a wallet request.
///
/// Every variant reaches the page as a rejected `request()` promise, see
/// [`WalletError::to_rpc_error`].
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// The bridge was called with an id that has no live session.
    #[error("no wallet session registered under id {0}")]
    SessionNotFound(SessionId),
    /// The method is deliberately not emulated.
    #[error("method `{0}` is not supported by the mock wallet")]
    UnsupportedOperation(String),
    /// The request parameters are malformed or not acceptable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The signer or the transport failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// The page target refused the bridge function or the init script.
    #[error("failed to install the wallet into the page: {0}")]
    Injection(eyre::Report),
}

impl WalletError {
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest(reason.into())
    }

    pub fn unsupported(method: impl Into<String>) -> Self {
        Self::UnsupportedOperation(method.into())
    }

    /// Converts the error into the object a page-side promise is rejected with.
    ///
    /// JSON-RPC errors returned by the transport keep their original code, message and data.
    pub fn to_rpc_error(&self) -> ProviderRpcError {
        match self {
            Self::SessionNotFound(_) => ProviderRpcError::new(DISCONNECTED, self.to_string()),
            Self::UnsupportedOperation(_) => {
                ProviderRpcError::new(UNSUPPORTED_METHOD, self.to_string())
            }
            Self::InvalidRequest(_) => ProviderRpcError::new(INVALID_PARAMS, self.to_string()),
            Self::Execution(ExecutionError::Transport(err)) => match err.as_error_resp() {
                Some(payload) => ProviderRpcError {
                    code: payload.code,
                    message: payload.message.to_string(),
                    data: payload
                        .data
                        .as_ref()
                        .and_then(|raw| serde_json::from_str(raw.get()).ok()),
                },
                None => ProviderRpcError::new(INTERNAL_ERROR, self.to_string()),
            },
            Self::Execution(_) | Self::Injection(_) => {
                ProviderRpcError::new(INTERNAL_ERROR, self.to_string())
            }
        }
    }
}

impl From<TransportError> for WalletError {
    fn from(err: TransportError) -> Self {
        Self::Execution(ExecutionError::Transport(err))
    }
}

impl From<alloy_signer::Error> for WalletError {
    fn from(err: alloy_signer::Error) -> Self {
        Self::Execution(ExecutionError::Signer(err))
    }
}

/// A failure of one of the wallet's external collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Transport(TransportError),
    #[error(transparent)]
    Signer(alloy_signer::Error),
    #[error("failed to build transaction: {0}")]
    Build(String),
    #[error("invalid RPC endpoint {url:?} for chain {chain_id}")]
    InvalidEndpoint { chain_id: u64, url: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// The EIP-1193 `ProviderRpcError` shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }
}

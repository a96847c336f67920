//! Per-chain routing of outbound RPC calls.

use alloy_provider::{DynProvider, RootProvider};
use parking_lot::Mutex;
use std::{collections::HashMap, fmt, sync::Arc};
use url::Url;

use crate::{
    chain::ChainDescriptor,
    error::{ExecutionError, WalletError},
};

/// The outbound transports of a wallet session, keyed by chain id.
///
/// An explicit override always wins. Chains without one get an HTTP provider against their first
/// default endpoint, built on first use and then reused.
#[derive(Clone, Default)]
pub struct Transports {
    overrides: HashMap<u64, DynProvider>,
    defaults: Arc<Mutex<HashMap<u64, DynProvider>>>,
}

impl fmt::Debug for Transports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transports")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .field("defaults", &self.defaults.lock().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Transports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes all calls for `chain_id` through `provider`.
    pub fn insert(&mut self, chain_id: u64, provider: DynProvider) {
        self.overrides.insert(chain_id, provider);
    }

    /// Builder-style [`Self::insert`].
    pub fn with(mut self, chain_id: u64, provider: DynProvider) -> Self {
        self.insert(chain_id, provider);
        self
    }

    /// Returns the transport for `chain`.
    pub fn get(&self, chain: &ChainDescriptor) -> Result<DynProvider, WalletError> {
        if let Some(provider) = self.overrides.get(&chain.id) {
            return Ok(provider.clone());
        }

        let mut defaults = self.defaults.lock();
        if let Some(provider) = defaults.get(&chain.id) {
            return Ok(provider.clone());
        }
        let url = chain.default_rpc_url().ok_or_else(|| ExecutionError::InvalidEndpoint {
            chain_id: chain.id,
            url: String::new(),
        })?;
        let provider = http_provider(chain.id, url)?;
        trace!(
            target: "mock_wallet::transport",
            chain = chain.name,
            url,
            "connected default transport"
        );
        defaults.insert(chain.id, provider.clone());
        Ok(provider)
    }
}

/// Builds an HTTP provider for `chain_id` against `url`.
pub fn http_provider(chain_id: u64, url: &str) -> Result<DynProvider, WalletError> {
    let url = Url::parse(url)
        .map_err(|_| ExecutionError::InvalidEndpoint { chain_id, url: url.to_string() })?;
    let provider: RootProvider = RootProvider::new_http(url);
    Ok(DynProvider::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{self, MAINNET};
    use alloy_provider::Provider;
    use mock_wallet_test_utils::ScriptedTransport;

    #[tokio::test]
    async fn overrides_take_precedence() {
        let scripted = ScriptedTransport::new();
        scripted.on_result("eth_blockNumber", "0x10");
        let transports = Transports::new().with(MAINNET.id, scripted.provider());

        assert!(transports.overrides.contains_key(&1));
        let provider = transports.get(&MAINNET).unwrap();
        assert_eq!(provider.get_block_number().await.unwrap(), 16);
        assert_eq!(scripted.call_count(), 1);
    }

    #[test]
    fn default_transports_are_cached_per_chain() {
        let transports = Transports::new();
        let sepolia = chain::by_id(11155111).unwrap();
        transports.get(sepolia).unwrap();
        transports.get(sepolia).unwrap();
        transports.get(&MAINNET).unwrap();
        assert_eq!(transports.defaults.lock().len(), 2);
        assert!(!transports.overrides.contains_key(&sepolia.id));
    }

    #[test]
    fn rejects_invalid_endpoints() {
        let err = http_provider(5, "not a url").unwrap_err();
        assert!(matches!(
            err,
            WalletError::Execution(ExecutionError::InvalidEndpoint { chain_id: 5, .. })
        ));
    }
}

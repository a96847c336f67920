//! Wallet presentation and runtime settings.

use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};

use crate::{
    account::Account,
    chain,
    error::WalletError,
    inject::{DEFAULT_BRIDGE_NAME, InstallOptions, WalletInfo},
};

/// The file name settings are read from when `MOCK_WALLET_CONFIG` is unset.
pub const CONFIG_FILE: &str = "mock-wallet.toml";

/// Settings of an installed wallet.
///
/// Values are merged from, in increasing priority:
/// - [`MockWalletConfig::default`]
/// - `mock-wallet.toml` in the working directory, or the file named by `MOCK_WALLET_CONFIG`
/// - `MOCK_WALLET_`-prefixed environment variables, e.g. `MOCK_WALLET_DEFAULT_CHAIN=11155111`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockWalletConfig {
    /// Wallet name announced over EIP-6963.
    pub name: String,
    /// Wallet icon announced over EIP-6963, as a data URI.
    pub icon: String,
    /// Reverse-DNS identifier announced over EIP-6963.
    pub rdns: String,
    /// Chain the wallet starts on.
    pub default_chain: u64,
    /// Log every bridge call.
    pub debug: bool,
    /// Name of the page function the provider calls into.
    pub bridge_name: String,
    /// Port of the HTTP bridge, `0` picks a free one.
    pub port: u16,
    /// RPC endpoints overriding the registry defaults, keyed by chain id or chain name.
    pub rpc_endpoints: BTreeMap<String, String>,
}

impl Default for MockWalletConfig {
    fn default() -> Self {
        let info = WalletInfo::default();
        Self {
            name: info.name,
            icon: info.icon,
            rdns: info.rdns,
            default_chain: 1,
            debug: false,
            bridge_name: DEFAULT_BRIDGE_NAME.to_string(),
            port: 0,
            rpc_endpoints: BTreeMap::new(),
        }
    }
}

impl MockWalletConfig {
    /// Loads the config from all sources, see [`Self::figment`].
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    /// Loads the config with `path` taking the place of the default config file.
    pub fn load_with_file(path: impl Into<PathBuf>) -> Result<Self, figment::Error> {
        Self::figment_with_file(path).extract()
    }

    /// Returns the default figment.
    pub fn figment() -> Figment {
        let path = std::env::var_os("MOCK_WALLET_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        Self::figment_with_file(path)
    }

    pub fn figment_with_file(path: impl Into<PathBuf>) -> Figment {
        Figment::from(Self::default())
            .merge(Toml::file(path.into()))
            .merge(Env::prefixed("MOCK_WALLET_").ignore(&["CONFIG", "PRIVATE_KEY"]))
    }

    /// The EIP-6963 info to announce. The uuid is left to the installer.
    pub fn wallet_info(&self) -> WalletInfo {
        WalletInfo {
            uuid: String::new(),
            name: self.name.clone(),
            icon: self.icon.clone(),
            rdns: self.rdns.clone(),
        }
    }

    /// Builds the installation parameters for `account` from these settings.
    pub fn install_options(
        &self,
        account: impl Into<Account>,
    ) -> Result<InstallOptions, WalletError> {
        let mut options = InstallOptions::new(account)
            .default_chain(self.default_chain)
            .debug(self.debug)
            .info(self.wallet_info());
        for (chain, url) in &self.rpc_endpoints {
            let chain_id = match chain.parse::<u64>() {
                Ok(id) => id,
                Err(_) => chain::by_name(chain).map(|chain| chain.id).ok_or_else(|| {
                    WalletError::invalid_request(format!(
                        "unknown chain `{chain}` in rpc_endpoints"
                    ))
                })?,
            };
            options = options.rpc_url(chain_id, url)?;
        }
        Ok(options)
    }
}

impl Provider for MockWalletConfig {
    fn metadata(&self) -> Metadata {
        Metadata::named("Mock wallet defaults")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Serialized::defaults(self).data()
    }
}

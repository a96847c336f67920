//! The wallet methods the emulator answers itself.

use strum::EnumString;

/// A provider method, parsed from the raw `method` string of a request.
///
/// Methods that are not emulated parse to [`WalletMethod::Unknown`] and are forwarded to the
/// transport of the current chain.
#[derive(Clone, Debug, PartialEq, Eq, EnumString)]
pub enum WalletMethod {
    #[strum(serialize = "eth_accounts")]
    Accounts,
    #[strum(serialize = "eth_requestAccounts")]
    RequestAccounts,
    #[strum(serialize = "wallet_requestPermissions")]
    RequestPermissions,
    #[strum(serialize = "wallet_revokePermissions")]
    RevokePermissions,
    #[strum(serialize = "wallet_getPermissions")]
    GetPermissions,
    #[strum(serialize = "wallet_switchEthereumChain")]
    SwitchChain,
    #[strum(serialize = "personal_sign")]
    PersonalSign,
    #[strum(
        serialize = "eth_signTypedData",
        serialize = "eth_signTypedData_v1",
        serialize = "eth_signTypedData_v3",
        serialize = "eth_signTypedData_v4"
    )]
    SignTypedData,
    #[strum(serialize = "eth_sendTransaction")]
    SendTransaction,
    #[strum(serialize = "eth_chainId")]
    ChainId,
    #[strum(default)]
    Unknown(String),
}

impl WalletMethod {
    pub fn parse(method: &str) -> Self {
        // `Unknown` is the default variant, so parsing cannot fail.
        method.parse().unwrap_or_else(|_| Self::Unknown(method.to_string()))
    }

    /// Whether the method is answered by the emulator rather than forwarded.
    pub fn is_emulated(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_emulated_methods() {
        assert_eq!(WalletMethod::parse("eth_accounts"), WalletMethod::Accounts);
        assert_eq!(WalletMethod::parse("wallet_switchEthereumChain"), WalletMethod::SwitchChain);
        for version in ["eth_signTypedData", "eth_signTypedData_v3", "eth_signTypedData_v4"] {
            assert_eq!(WalletMethod::parse(version), WalletMethod::SignTypedData);
        }
        assert!(WalletMethod::parse("eth_sendTransaction").is_emulated());
    }

    #[test]
    fn keeps_raw_name_of_unknown_methods() {
        let method = WalletMethod::parse("eth_getBalance");
        assert_eq!(method, WalletMethod::Unknown("eth_getBalance".to_string()));
        assert!(!method.is_emulated());
        // matching is case sensitive, like real providers
        assert!(!WalletMethod::parse("ETH_ACCOUNTS").is_emulated());
    }
}

//! The account a wallet session is bound to.

use alloy_network::EthereumWallet;
use alloy_primitives::{Address, B256, hex::FromHex};
use alloy_signer::{Signature, Signer};
use alloy_signer_local::PrivateKeySigner;

use crate::error::{PrivateKeyError, WalletError};

/// The account capability bound to a session.
#[derive(Clone, Debug)]
pub enum Account {
    /// A key held by the host. Messages and transactions are signed locally.
    Local(PrivateKeySigner),
    /// An address whose keys live with the node behind the transport, e.g. an unlocked or
    /// impersonated anvil account. Transactions are signed by the node; messages cannot be.
    Remote(Address),
}

impl Account {
    /// Validates and sanitizes a hex private key, returning a [`Account::Local`].
    pub fn from_private_key(private_key: &str) -> Result<Self, PrivateKeyError> {
        let private_key = private_key.trim();
        let key = match B256::from_hex(private_key) {
            Ok(key) => key,
            Err(err) => {
                ensure_pk_not_env(private_key)?;
                return Err(err.into());
            }
        };
        match PrivateKeySigner::from_bytes(&key) {
            Ok(signer) => Ok(Self::Local(signer)),
            Err(err) => {
                ensure_pk_not_env(private_key)?;
                Err(PrivateKeyError::InvalidKey(err.into()))
            }
        }
    }

    pub fn address(&self) -> Address {
        match self {
            Self::Local(signer) => signer.address(),
            Self::Remote(address) => *address,
        }
    }

    /// Whether the account can produce signatures on the host.
    pub fn can_sign(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Signs `message` as an EIP-191 personal message.
    pub async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        match self {
            Self::Local(signer) => Ok(signer.sign_message(message).await?),
            Self::Remote(_) => Err(WalletError::unsupported("personal_sign")),
        }
    }

    /// The network wallet used to sign transactions, if the account holds a key.
    pub(crate) fn network_wallet(&self) -> Option<EthereumWallet> {
        match self {
            Self::Local(signer) => Some(EthereumWallet::from(signer.clone())),
            Self::Remote(_) => None,
        }
    }
}

impl From<PrivateKeySigner> for Account {
    fn from(signer: PrivateKeySigner) -> Self {
        Self::Local(signer)
    }
}

impl From<Address> for Account {
    fn from(address: Address) -> Self {
        Self::Remote(address)
    }
}

fn ensure_pk_not_env(pk: &str) -> Result<(), PrivateKeyError> {
    if !pk.starts_with("0x") && std::env::var(pk).is_ok() {
        return Err(PrivateKeyError::ExistsAsEnvVar(pk.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_wallet_test_utils::{DEV_ADDRESSES, DEV_KEYS, dev_signer};

    #[test]
    fn parses_private_keys() {
        let account = Account::from_private_key(DEV_KEYS[0]).unwrap();
        assert_eq!(account.address(), DEV_ADDRESSES[0]);
        assert!(account.can_sign());

        let unprefixed = DEV_KEYS[1].trim_start_matches("0x");
        assert_eq!(Account::from_private_key(unprefixed).unwrap().address(), DEV_ADDRESSES[1]);
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(matches!(
            Account::from_private_key("0xnothex"),
            Err(PrivateKeyError::InvalidHex(_))
        ));
        let zero = format!("0x{}", "00".repeat(32));
        assert!(matches!(Account::from_private_key(&zero), Err(PrivateKeyError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn remote_accounts_cannot_sign_messages() {
        let account = Account::from(DEV_ADDRESSES[0]);
        assert!(!account.can_sign());
        let err = account.sign_message(b"hello").await.unwrap_err();
        assert!(matches!(err, WalletError::UnsupportedOperation(_)));
    }

    #[tokio::test]
    async fn local_signature_matches_signer() {
        let signer = dev_signer(0);
        let expected = signer.sign_message(b"hello").await.unwrap();
        let signature = Account::from(signer).sign_message(b"hello").await.unwrap();
        assert_eq!(signature, expected);
    }
}

//! # mock-wallet
//!
//! An injected browser wallet for end-to-end testing of dApp frontends.
//!
//! The wallet is split across two execution contexts:
//! - the page context, which receives a script before any page script runs. The script builds an
//!   [EIP-1193](https://eips.ethereum.org/EIPS/eip-1193) provider and announces it through
//!   [EIP-6963](https://eips.ethereum.org/EIPS/eip-6963) discovery events.
//! - the host context, which holds the signer and the per-chain transports and answers every
//!   provider request through a single bridge function.
//!
//! ## Architecture
//!
//! 1. [`MockWallet::install`] creates a [`WalletSession`] and registers it under a fresh
//!    [`SessionId`].
//! 2. The [`Bridge`] is exposed to the page through a [`PageTarget`], and the provider script is
//!    injected with the session id baked in.
//! 3. Page requests reach [`Bridge::call`], which looks up the session and awaits
//!    [`WalletSession::dispatch`].
//! 4. Emulated methods are answered locally. Everything else is forwarded to the transport of the
//!    session's current chain.

#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate tracing;

pub mod account;
pub mod bridge;
pub mod chain;
pub mod config;
pub mod error;
pub mod inject;
pub mod method;
pub mod registry;
pub mod server;
pub mod session;
pub mod transport;

mod tx;

pub use account::Account;
pub use bridge::{Bridge, BridgeCall, BridgeFn, BridgeResponse};
pub use chain::ChainDescriptor;
pub use config::MockWalletConfig;
pub use error::{ExecutionError, ProviderRpcError, WalletError};
pub use inject::{InitScript, InstallOptions, MockWallet, PageTarget, WalletInfo};
pub use method::WalletMethod;
pub use registry::{SessionId, SessionRegistry};
pub use server::BridgeServer;
pub use session::{RpcRequest, WalletSession};
pub use transport::Transports;

//! Helpers shared by the mock-wallet test suites.

#![warn(unused_crate_dependencies, unreachable_pub)]

mod transport;
pub use transport::{RecordedCall, ScriptedTransport};

use alloy_primitives::{Address, address};
use alloy_signer_local::PrivateKeySigner;

/// Private keys of the well-known anvil/hardhat development accounts.
pub const DEV_KEYS: [&str; 2] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
];

/// Addresses belonging to [`DEV_KEYS`], in the same order.
pub const DEV_ADDRESSES: [Address; 2] = [
    address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
    address!("0x70997970C51812dc3A010C7d01b50e0d17dc79C8"),
];

/// Returns the signer for the dev account at `index`.
///
/// # Panics
///
/// Panics if `index` is out of range.
pub fn dev_signer(index: usize) -> PrivateKeySigner {
    DEV_KEYS[index].parse().expect("dev keys are valid")
}

/// Initializes tracing for tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

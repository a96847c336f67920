//! Subcommands of the `mock-wallet` binary.

pub mod chains;
pub mod serve;

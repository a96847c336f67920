use crate::cmd::{chains::ChainsArgs, serve::ServeArgs};
use clap::{Parser, Subcommand};

/// Run an injected EIP-1193 wallet for end-to-end tests of dApp frontends.
#[derive(Parser)]
#[command(name = "mock-wallet", version, next_display_order = None)]
pub struct MockWalletArgs {
    #[command(subcommand)]
    pub cmd: MockWalletSubcommand,
}

#[derive(Subcommand)]
pub enum MockWalletSubcommand {
    /// Serve the HTTP bridge for one wallet and print the script to inject into the page.
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// List the chains the wallet can switch to.
    #[command(visible_alias = "c")]
    Chains(ChainsArgs),
}

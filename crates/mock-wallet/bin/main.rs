#[macro_use]
extern crate tracing;

use clap::Parser;
use eyre::Result;
use tracing_subscriber::EnvFilter;

pub mod args;
pub mod cmd;

use args::{MockWalletArgs, MockWalletSubcommand};

fn main() -> Result<()> {
    subscriber();
    let args = MockWalletArgs::parse();
    main_args(args)
}

#[tokio::main]
async fn main_args(args: MockWalletArgs) -> Result<()> {
    match args.cmd {
        MockWalletSubcommand::Serve(cmd) => cmd.run().await?,
        MockWalletSubcommand::Chains(cmd) => cmd.run()?,
    }
    Ok(())
}

/// Logs to stderr, keeping stdout for command output. `RUST_LOG` overrides the `info` default.
fn subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

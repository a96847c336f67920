use clap::{Parser, ValueHint};
use eyre::{Result, WrapErr};
use mock_wallet::{Account, BridgeServer, MockWallet, MockWalletConfig, chain};
use std::path::PathBuf;

/// CLI arguments for `mock-wallet serve`.
#[derive(Clone, Debug, Parser)]
pub struct ServeArgs {
    /// The private key of the wallet account.
    #[arg(long, env = "MOCK_WALLET_PRIVATE_KEY", hide_env_values = true, value_name = "HEX")]
    pub private_key: String,

    /// Port of the HTTP bridge. Defaults to the configured port, or a free one.
    #[arg(long, short)]
    pub port: Option<u16>,

    /// The chain the wallet starts on, by id or name.
    #[arg(long, short, value_name = "CHAIN")]
    pub chain: Option<String>,

    /// Log every bridge call.
    #[arg(long)]
    pub debug: bool,

    /// Path to the config file.
    #[arg(long, env = "MOCK_WALLET_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Write the init script to this file instead of stdout.
    #[arg(long, short, value_hint = ValueHint::FilePath)]
    pub out: Option<PathBuf>,
}

impl ServeArgs {
    pub async fn run(self) -> Result<()> {
        let Self { private_key, port, chain, debug, config, out } = self;

        let mut config = match config {
            Some(path) => MockWalletConfig::load_with_file(path)?,
            None => MockWalletConfig::load()?,
        };
        if let Some(port) = port {
            config.port = port;
        }
        if let Some(chain) = chain {
            config.default_chain = parse_chain(&chain)?;
        }
        config.debug |= debug;

        let account = Account::from_private_key(&private_key)?;
        let address = account.address();

        let wallet = MockWallet::with_bridge_name(config.bridge_name.clone());
        let mut server = BridgeServer::new(wallet.bridge().clone(), config.port);
        server.start().await.wrap_err("failed to start the bridge server")?;

        let (id, script) =
            wallet.install_http(config.install_options(account)?, server.url(), server.token())?;
        info!(wallet = id.short(), %address, chain = config.default_chain, "wallet installed");

        match out {
            Some(path) => {
                std::fs::write(&path, script.render())?;
                info!(path = %path.display(), "wrote init script");
            }
            None => println!("{script}"),
        }

        tokio::signal::ctrl_c().await?;
        info!("shutting down");
        wallet.uninstall(&id);
        server.stop().await?;
        Ok(())
    }
}

fn parse_chain(chain: &str) -> Result<u64> {
    if let Ok(id) = chain.parse::<u64>() {
        return Ok(id);
    }
    chain::by_name(chain)
        .map(|chain| chain.id)
        .ok_or_else(|| eyre::eyre!("unknown chain `{chain}`, see `mock-wallet chains`"))
}

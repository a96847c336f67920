use clap::Parser;
use eyre::Result;
use mock_wallet::chain::CHAINS;

/// CLI arguments for `mock-wallet chains`.
#[derive(Clone, Debug, Parser)]
pub struct ChainsArgs {
    /// Print the registry as JSON.
    #[arg(long, short)]
    json: bool,
}

impl ChainsArgs {
    pub fn run(self) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(CHAINS)?);
            return Ok(());
        }

        let width = CHAINS.iter().map(|chain| chain.name.len()).max().unwrap_or(0);
        for chain in CHAINS {
            let url = chain.default_rpc_url().unwrap_or("-");
            println!("{:>10}  {:#10x}  {:width$}  {url}", chain.id, chain.id, chain.name);
        }
        Ok(())
    }
}

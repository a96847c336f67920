//! Static registry of the chains the wallet knows how to reach.

use serde::Serialize;

/// Static metadata of a network the wallet can switch to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ChainDescriptor {
    pub id: u64,
    pub name: &'static str,
    /// Public RPC endpoints, in order of preference.
    pub rpc_urls: &'static [&'static str],
}

impl ChainDescriptor {
    /// The endpoint used when no transport override is configured for this chain.
    pub fn default_rpc_url(&self) -> Option<&'static str> {
        self.rpc_urls.first().copied()
    }

    /// The chain id as a `0x`-prefixed quantity, as `eth_chainId` reports it.
    pub fn hex_id(&self) -> String {
        format!("{:#x}", self.id)
    }
}

/// Ethereum mainnet, the chain every session starts on unless configured otherwise.
pub const MAINNET: ChainDescriptor =
    ChainDescriptor { id: 1, name: "mainnet", rpc_urls: &["https://eth.merkle.io"] };

/// All known chains.
pub static CHAINS: &[ChainDescriptor] = &[
    MAINNET,
    ChainDescriptor { id: 11155111, name: "sepolia", rpc_urls: &["https://sepolia.drpc.org"] },
    ChainDescriptor {
        id: 17000,
        name: "holesky",
        rpc_urls: &["https://ethereum-holesky-rpc.publicnode.com"],
    },
    ChainDescriptor { id: 10, name: "optimism", rpc_urls: &["https://mainnet.optimism.io"] },
    ChainDescriptor {
        id: 11155420,
        name: "optimism-sepolia",
        rpc_urls: &["https://sepolia.optimism.io"],
    },
    ChainDescriptor { id: 8453, name: "base", rpc_urls: &["https://mainnet.base.org"] },
    ChainDescriptor { id: 84532, name: "base-sepolia", rpc_urls: &["https://sepolia.base.org"] },
    ChainDescriptor { id: 42161, name: "arbitrum", rpc_urls: &["https://arb1.arbitrum.io/rpc"] },
    ChainDescriptor {
        id: 421614,
        name: "arbitrum-sepolia",
        rpc_urls: &["https://sepolia-rollup.arbitrum.io/rpc"],
    },
    ChainDescriptor { id: 137, name: "polygon", rpc_urls: &["https://polygon-rpc.com"] },
    ChainDescriptor { id: 100, name: "gnosis", rpc_urls: &["https://rpc.gnosischain.com"] },
    ChainDescriptor { id: 31337, name: "anvil", rpc_urls: &["http://127.0.0.1:8545"] },
];

/// Looks up a chain by its numeric id.
pub fn by_id(id: u64) -> Option<&'static ChainDescriptor> {
    CHAINS.iter().find(|chain| chain.id == id)
}

/// Looks up a chain by its name, e.g. `sepolia`.
pub fn by_name(name: &str) -> Option<&'static ChainDescriptor> {
    CHAINS.iter().find(|chain| chain.name.eq_ignore_ascii_case(name))
}

/// Resolves a hex chain id to a known chain, falling back to [`MAINNET`].
///
/// This never fails: dApps assume `wallet_switchEthereumChain` succeeds, so unknown or malformed
/// ids resolve to the default instead of surfacing an error.
pub fn resolve(chain_id_hex: Option<&str>) -> &'static ChainDescriptor {
    resolve_or(chain_id_hex, &CHAINS[0])
}

/// Same as [`resolve`] but with a caller-provided fallback.
pub fn resolve_or(
    chain_id_hex: Option<&str>,
    fallback: &'static ChainDescriptor,
) -> &'static ChainDescriptor {
    chain_id_hex.and_then(parse_hex_id).and_then(by_id).unwrap_or(fallback)
}

fn parse_hex_id(hex: &str) -> Option<u64> {
    let digits = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X")).unwrap_or(hex);
    u64::from_str_radix(digits, 16).ok()
}

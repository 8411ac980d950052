//! Price-oracle descriptors.

use serde::Serialize;

/// How consumers obtain a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleKind {
    /// Aggregator contract updated by the oracle network; consumers read it.
    PushFeed,
    /// Signed price updates fetched off-chain and submitted with the consumer's transaction.
    PullFeed,
    /// Consumer requests a price and receives it in a callback or packet.
    RequestResponse,
    /// Price objects stored natively in ledger state.
    LedgerNative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedId {
    pub pair: &'static str,
    /// Network the identifier applies to.
    pub chain: &'static str,
    pub id: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OracleDescriptor {
    pub name: &'static str,
    pub kind: OracleKind,
    pub chains: &'static [&'static str],
    pub docs_url: &'static str,
    pub api_base_url: Option<&'static str>,
    pub feeds: &'static [FeedId],
    pub notes: &'static str,
}

static ORACLES: &[OracleDescriptor] = &[
    OracleDescriptor {
        name: "Chainlink Data Feeds",
        kind: OracleKind::PushFeed,
        chains: &["ethereum", "bsc", "polygon", "avalanche"],
        docs_url: "https://docs.chain.link/data-feeds",
        api_base_url: None,
        feeds: &[
            FeedId {
                pair: "ETH/USD",
                chain: "ethereum",
                id: "0x5f4eC3Df9cbd43714FE2740f5E3616155c5b8419",
            },
            FeedId {
                pair: "BTC/USD",
                chain: "ethereum",
                id: "0xF4030086522a5bEEa4988F8cA5B36dbC97BeE88c",
            },
        ],
        notes: "Call latestRoundData() on the aggregator proxy; scale the answer by decimals().",
    },
    OracleDescriptor {
        name: "Pyth Network",
        kind: OracleKind::PullFeed,
        chains: &["ethereum", "bsc", "polygon", "avalanche", "osmosis"],
        docs_url: "https://docs.pyth.network/price-feeds",
        api_base_url: Some("https://hermes.pyth.network"),
        feeds: &[
            FeedId {
                pair: "BTC/USD",
                chain: "any",
                id: "0xe62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43",
            },
            FeedId {
                pair: "ETH/USD",
                chain: "any",
                id: "0xff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace",
            },
        ],
        notes: "Fetch signed updates from Hermes (/v2/updates/price/latest) and pass them to updatePriceFeeds before reading.",
    },
    OracleDescriptor {
        name: "Band Protocol",
        kind: OracleKind::RequestResponse,
        chains: &["cosmos", "osmosis", "ethereum", "bsc"],
        docs_url: "https://docs.bandchain.org",
        api_base_url: Some("https://laozi1.bandchain.org/api"),
        feeds: &[],
        notes: "Cosmos chains receive prices over IBC oracle packets; EVM chains read the StdReference contract.",
    },
    OracleDescriptor {
        name: "DIA",
        kind: OracleKind::PushFeed,
        chains: &["ethereum", "polygon", "avalanche", "bsc"],
        docs_url: "https://docs.diadata.org",
        api_base_url: Some("https://api.diadata.org/v1"),
        feeds: &[FeedId {
            pair: "BTC/USD",
            chain: "api",
            id: "/assetQuotation/Bitcoin/0x0000000000000000000000000000000000000000",
        }],
        notes: "REST quotations are free; on-chain feeds are deployed per dApp request.",
    },
    OracleDescriptor {
        name: "Reflector",
        kind: OracleKind::PushFeed,
        chains: &["stellar"],
        docs_url: "https://reflector.network/docs",
        api_base_url: None,
        feeds: &[],
        notes: "Soroban contracts implementing SEP-40; call lastprice(asset) on the network's contract.",
    },
    OracleDescriptor {
        name: "XRPL Price Oracles",
        kind: OracleKind::LedgerNative,
        chains: &["xrp"],
        docs_url: "https://xrpl.org/docs/concepts/decentralized-storage/price-oracles",
        api_base_url: None,
        feeds: &[],
        notes: "XLS-47 Oracle ledger objects; read with ledger_entry or get_aggregate_price.",
    },
];

pub fn all() -> &'static [OracleDescriptor] {
    ORACLES
}

/// Case-insensitive lookup by name or by the name's first word (`pyth`, `chainlink`).
pub fn find(name: &str) -> Option<&'static OracleDescriptor> {
    let name = name.trim();
    ORACLES.iter().find(|oracle| {
        oracle.name.eq_ignore_ascii_case(name)
            || oracle
                .name
                .split_whitespace()
                .next()
                .is_some_and(|first| first.eq_ignore_ascii_case(name))
    })
}

/// Oracles available on `chain` (e.g. `stellar`, `ethereum`).
pub fn for_chain(chain: &str) -> Vec<&'static OracleDescriptor> {
    ORACLES
        .iter()
        .filter(|oracle| oracle.chains.iter().any(|c| c.eq_ignore_ascii_case(chain)))
        .collect()
}

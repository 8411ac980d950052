//! NFT marketplace descriptors.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketplaceDescriptor {
    pub name: &'static str,
    pub chains: &'static [&'static str],
    pub url: &'static str,
    pub api_base_url: Option<&'static str>,
    pub token_standards: &'static [&'static str],
    pub notes: &'static str,
}

static MARKETPLACES: &[MarketplaceDescriptor] = &[
    MarketplaceDescriptor {
        name: "OpenSea",
        chains: &["ethereum", "polygon", "avalanche"],
        url: "https://opensea.io",
        api_base_url: Some("https://api.opensea.io/api/v2"),
        token_standards: &["ERC-721", "ERC-1155"],
        notes: "API requires an X-API-KEY header; reads token metadata from tokenURI.",
    },
    MarketplaceDescriptor {
        name: "Stargaze",
        chains: &["stargaze"],
        url: "https://www.stargaze.zone",
        api_base_url: Some("https://graphql.mainnet.stargaze-apis.com/graphql"),
        token_standards: &["SG-721", "CW-721"],
        notes: "Collections are CosmWasm sg721 contracts created through launchpad factories.",
    },
    MarketplaceDescriptor {
        name: "xrp.cafe",
        chains: &["xrp"],
        url: "https://xrp.cafe",
        api_base_url: None,
        token_standards: &["XLS-20"],
        notes: "Ledger-native NFTokens; the URI field holds the hex-encoded metadata URI.",
    },
    MarketplaceDescriptor {
        name: "Litemint",
        chains: &["stellar"],
        url: "https://litemint.com",
        api_base_url: None,
        token_standards: &["SEP-39"],
        notes: "Stellar assets with ipfshash/url entries in the issuer's data or TOML.",
    },
    MarketplaceDescriptor {
        name: "objkt",
        chains: &["tezos"],
        url: "https://objkt.com",
        api_base_url: Some("https://data.objkt.com/v3/graphql"),
        token_standards: &["FA2", "TZIP-21"],
        notes: "Reads artifactUri and displayUri from TZIP-21 metadata.",
    },
];

pub fn all() -> &'static [MarketplaceDescriptor] {
    MARKETPLACES
}

pub fn find(name: &str) -> Option<&'static MarketplaceDescriptor> {
    let name = name.trim();
    MARKETPLACES
        .iter()
        .find(|marketplace| marketplace.name.eq_ignore_ascii_case(name))
}

pub fn for_chain(chain: &str) -> Vec<&'static MarketplaceDescriptor> {
    MARKETPLACES
        .iter()
        .filter(|marketplace| marketplace.chains.iter().any(|c| c.eq_ignore_ascii_case(chain)))
        .collect()
}

//! Built-in currency registry.

use crate::currency::types::{ChainFamily, CurrencyDescriptor, SocialLinks};
use crate::keys::DerivationPaths;

static CURRENCIES: &[CurrencyDescriptor] = &[
    CurrencyDescriptor {
        ticker: "ATOM",
        name: "Cosmos Hub",
        family: ChainFamily::Cosmos { hrp: "cosmos" },
        chain_id: "cosmos:cosmoshub-4",
        base_denom: "uatom",
        decimals: 6,
        coin_type: 118,
        derivation_path: DerivationPaths::COSMOS,
        explorer_address_url: "https://www.mintscan.io/cosmos/address/{address}",
        explorer_tx_url: "https://www.mintscan.io/cosmos/tx/{hash}",
        links: SocialLinks {
            website: "https://cosmos.network",
            twitter: "https://twitter.com/cosmos",
            github: "https://github.com/cosmos",
            docs: "https://hub.cosmos.network",
        },
    },
    CurrencyDescriptor {
        ticker: "OSMO",
        name: "Osmosis",
        family: ChainFamily::Cosmos { hrp: "osmo" },
        chain_id: "cosmos:osmosis-1",
        base_denom: "uosmo",
        decimals: 6,
        coin_type: 118,
        derivation_path: DerivationPaths::COSMOS,
        explorer_address_url: "https://www.mintscan.io/osmosis/address/{address}",
        explorer_tx_url: "https://www.mintscan.io/osmosis/tx/{hash}",
        links: SocialLinks {
            website: "https://osmosis.zone",
            twitter: "https://twitter.com/osmosiszone",
            github: "https://github.com/osmosis-labs",
            docs: "https://docs.osmosis.zone",
        },
    },
    CurrencyDescriptor {
        ticker: "JUNO",
        name: "Juno",
        family: ChainFamily::Cosmos { hrp: "juno" },
        chain_id: "cosmos:juno-1",
        base_denom: "ujuno",
        decimals: 6,
        coin_type: 118,
        derivation_path: DerivationPaths::COSMOS,
        explorer_address_url: "https://www.mintscan.io/juno/address/{address}",
        explorer_tx_url: "https://www.mintscan.io/juno/tx/{hash}",
        links: SocialLinks {
            website: "https://junonetwork.io",
            twitter: "https://twitter.com/JunoNetwork",
            github: "https://github.com/CosmosContracts",
            docs: "https://docs.junonetwork.io",
        },
    },
    CurrencyDescriptor {
        ticker: "STARS",
        name: "Stargaze",
        family: ChainFamily::Cosmos { hrp: "stars" },
        chain_id: "cosmos:stargaze-1",
        base_denom: "ustars",
        decimals: 6,
        coin_type: 118,
        derivation_path: DerivationPaths::COSMOS,
        explorer_address_url: "https://www.mintscan.io/stargaze/address/{address}",
        explorer_tx_url: "https://www.mintscan.io/stargaze/tx/{hash}",
        links: SocialLinks {
            website: "https://stargaze.zone",
            twitter: "https://twitter.com/StargazeZone",
            github: "https://github.com/public-awesome",
            docs: "https://docs.stargaze.zone",
        },
    },
    CurrencyDescriptor {
        ticker: "XLM",
        name: "Stellar",
        family: ChainFamily::Stellar,
        chain_id: "stellar:pubnet",
        base_denom: "stroop",
        decimals: 7,
        coin_type: 148,
        derivation_path: DerivationPaths::STELLAR,
        explorer_address_url: "https://stellar.expert/explorer/public/account/{address}",
        explorer_tx_url: "https://stellar.expert/explorer/public/tx/{hash}",
        links: SocialLinks {
            website: "https://stellar.org",
            twitter: "https://twitter.com/StellarOrg",
            github: "https://github.com/stellar",
            docs: "https://developers.stellar.org",
        },
    },
    CurrencyDescriptor {
        ticker: "XRP",
        name: "XRP Ledger",
        family: ChainFamily::Xrp,
        chain_id: "xrpl:0",
        base_denom: "drop",
        decimals: 6,
        coin_type: 144,
        derivation_path: DerivationPaths::XRP,
        explorer_address_url: "https://livenet.xrpl.org/accounts/{address}",
        explorer_tx_url: "https://livenet.xrpl.org/transactions/{hash}",
        links: SocialLinks {
            website: "https://xrpl.org",
            twitter: "https://twitter.com/XRPLF",
            github: "https://github.com/XRPLF",
            docs: "https://xrpl.org/docs",
        },
    },
    CurrencyDescriptor {
        ticker: "ETH",
        name: "Ethereum",
        family: ChainFamily::Evm { network: "ethereum" },
        chain_id: "eip155:1",
        base_denom: "wei",
        decimals: 18,
        coin_type: 60,
        derivation_path: DerivationPaths::EVM,
        explorer_address_url: "https://etherscan.io/address/{address}",
        explorer_tx_url: "https://etherscan.io/tx/{hash}",
        links: SocialLinks {
            website: "https://ethereum.org",
            twitter: "https://twitter.com/ethereum",
            github: "https://github.com/ethereum",
            docs: "https://ethereum.org/developers/docs",
        },
    },
    CurrencyDescriptor {
        ticker: "BNB",
        name: "BNB Smart Chain",
        family: ChainFamily::Evm { network: "bsc" },
        chain_id: "eip155:56",
        base_denom: "wei",
        decimals: 18,
        coin_type: 60,
        derivation_path: DerivationPaths::EVM,
        explorer_address_url: "https://bscscan.com/address/{address}",
        explorer_tx_url: "https://bscscan.com/tx/{hash}",
        links: SocialLinks {
            website: "https://www.bnbchain.org",
            twitter: "https://twitter.com/BNBCHAIN",
            github: "https://github.com/bnb-chain",
            docs: "https://docs.bnbchain.org",
        },
    },
    CurrencyDescriptor {
        ticker: "POL",
        name: "Polygon PoS",
        family: ChainFamily::Evm { network: "polygon" },
        chain_id: "eip155:137",
        base_denom: "wei",
        decimals: 18,
        coin_type: 60,
        derivation_path: DerivationPaths::EVM,
        explorer_address_url: "https://polygonscan.com/address/{address}",
        explorer_tx_url: "https://polygonscan.com/tx/{hash}",
        links: SocialLinks {
            website: "https://polygon.technology",
            twitter: "https://twitter.com/0xPolygon",
            github: "https://github.com/0xPolygon",
            docs: "https://docs.polygon.technology",
        },
    },
    CurrencyDescriptor {
        ticker: "AVAX",
        name: "Avalanche C-Chain",
        family: ChainFamily::Evm { network: "avalanche" },
        chain_id: "eip155:43114",
        base_denom: "wei",
        decimals: 18,
        coin_type: 60,
        derivation_path: DerivationPaths::EVM,
        explorer_address_url: "https://snowtrace.io/address/{address}",
        explorer_tx_url: "https://snowtrace.io/tx/{hash}",
        links: SocialLinks {
            website: "https://www.avax.network",
            twitter: "https://twitter.com/avax",
            github: "https://github.com/ava-labs",
            docs: "https://build.avax.network/docs",
        },
    },
];

/// Every built-in currency, in display order.
pub fn all() -> &'static [CurrencyDescriptor] {
    CURRENCIES
}

/// Look up a currency by ticker, case-insensitively.
pub fn find(ticker: &str) -> Option<&'static CurrencyDescriptor> {
    let ticker = ticker.trim();
    CURRENCIES
        .iter()
        .find(|currency| currency.ticker.eq_ignore_ascii_case(ticker))
}

/// Look up a currency by CAIP-2 chain id.
pub fn find_by_chain_id(chain_id: &str) -> Option<&'static CurrencyDescriptor> {
    CURRENCIES.iter().find(|currency| currency.chain_id == chain_id)
}

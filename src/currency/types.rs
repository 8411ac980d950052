//! Currency descriptor types.

use serde::Serialize;

use crate::chains::{ChainDeriver, CosmosDeriver, DerivedIdentity, EvmDeriver, StellarDeriver, XrpDeriver};
use crate::keys::KeyResult;

/// Key and address scheme shared by a group of chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainFamily {
    /// Cosmos SDK, parametrized by bech32 prefix.
    Cosmos { hrp: &'static str },
    Stellar,
    Xrp,
    /// EVM-compatible; the network name labels derived identities.
    Evm { network: &'static str },
}

impl ChainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainFamily::Cosmos { .. } => "cosmos",
            ChainFamily::Stellar => "stellar",
            ChainFamily::Xrp => "xrp",
            ChainFamily::Evm { .. } => "evm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SocialLinks {
    pub website: &'static str,
    pub twitter: &'static str,
    pub github: &'static str,
    pub docs: &'static str,
}

/// Static metadata for one currency and its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyDescriptor {
    pub ticker: &'static str,
    pub name: &'static str,
    pub family: ChainFamily,
    /// CAIP-2 chain id, e.g. `eip155:1`.
    pub chain_id: &'static str,
    /// Smallest on-chain unit.
    pub base_denom: &'static str,
    pub decimals: u8,
    /// SLIP-0044 coin type.
    pub coin_type: u32,
    pub derivation_path: &'static str,
    /// Address page template; `{address}` is replaced verbatim.
    pub explorer_address_url: &'static str,
    /// Transaction page template; `{hash}` is replaced verbatim.
    pub explorer_tx_url: &'static str,
    pub links: SocialLinks,
}

impl CurrencyDescriptor {
    /// Explorer page for `address`. The address is not validated.
    pub fn block_explorer_link(&self, address: &str) -> String {
        self.explorer_address_url.replace("{address}", address)
    }

    /// Explorer page for a transaction hash. The hash is not validated.
    pub fn transaction_link(&self, tx_hash: &str) -> String {
        self.explorer_tx_url.replace("{hash}", tx_hash)
    }

    /// Key deriver for this currency's chain.
    pub fn deriver(&self) -> Box<dyn ChainDeriver> {
        match self.family {
            ChainFamily::Cosmos { hrp } => Box::new(CosmosDeriver::new(hrp)),
            ChainFamily::Stellar => Box::new(StellarDeriver::new()),
            ChainFamily::Xrp => Box::new(XrpDeriver::new()),
            ChainFamily::Evm { network } => Box::new(EvmDeriver::new(network)),
        }
    }

    /// Derive the public identity for a private key on this currency's chain.
    pub fn derive(&self, input: &str) -> KeyResult<DerivedIdentity> {
        self.deriver().derive(input)
    }
}

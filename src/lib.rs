//! Wallet reference catalog: key derivation, explorers, keystores, exchange
//! clients, NFT minting, oracle/marketplace descriptors and wallet-connection
//! sessions.

// Key material
pub mod chains;
pub mod currency;
pub mod keys;
pub mod keystore;

// Remote integrations
pub mod blockchain;
pub mod exchanges;
pub mod http;
pub mod minting;
pub mod sessions;

// Reference data
pub mod catalog;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use config::schema::CatalogConfig;
pub use currency::CurrencyDescriptor;
pub use exchanges::{ExchangeClient, ExchangeKind};

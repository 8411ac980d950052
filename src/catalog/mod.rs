//! Oracle and NFT-marketplace reference data.
//!
//! Descriptors are `'static` data for display and lookup; nothing here
//! talks to the services they describe.

pub mod marketplaces;
pub mod oracles;

pub use marketplaces::MarketplaceDescriptor;
pub use oracles::{FeedId, OracleDescriptor, OracleKind};

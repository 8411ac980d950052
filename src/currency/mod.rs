//! Static currency descriptors: chain parameters, explorer links and key derivers.

pub mod registry;
pub mod types;

pub use registry::{all, find, find_by_chain_id};
pub use types::{ChainFamily, CurrencyDescriptor, SocialLinks};

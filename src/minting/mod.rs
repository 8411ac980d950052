//! NFT minting: pin content to IPFS, then mint with a URI pointing at it.
//!
//! # Data Flow
//! ```text
//! asset bytes + metadata template + recipient
//!     → PinningService::pin_file      (asset CID)
//!     → NftMetadata { image: ipfs://<asset CID> }
//!     → PinningService::pin_json      (metadata CID)
//!     → NftMinter::mint(recipient, ipfs://<metadata CID>)
//!     → MintReceipt
//! ```
//!
//! # Design Decisions
//! - Pinned content cannot be unpinned on failure; `MintError::Orphaned`
//!   carries the CIDs instead
//! - Only EVM contracts are minted on; other chains plug in through `NftMinter`

pub mod evm;
pub mod ipfs_api;
pub mod pinata;
pub mod pinning;
pub mod pipeline;
pub mod types;

pub use evm::EvmNftMinter;
pub use ipfs_api::{IpfsApiPinning, IpfsAuth};
pub use pinata::PinataPinning;
pub use pinning::{build_pinning_service, PinningService};
pub use pipeline::{MintPipeline, MintRequest, NftMinter};
pub use types::{MetadataAttribute, MintError, MintReceipt, MintResult, NftMetadata};

//! EVM integration used by the NFT minter.
//!
//! # Data Flow
//! ```text
//! Environment variable (minter private key) or decrypted keystore
//!     → wallet.rs (key loading, signing)
//!     → client.rs (RPC connection with failover and timeouts)
//!     → transaction.rs (build, sign, broadcast, confirm)
//! ```
//!
//! # Security Constraints
//! - Private keys never come from the config file
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use transaction::TxBuilder;
pub use types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId, ConfirmationStatus};
pub use wallet::Wallet;

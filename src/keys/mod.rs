//! Private key input handling.
//!
//! # Data Flow
//! ```text
//! caller string (hex, base58, chain secret, mnemonic)
//!     → normalize.rs (trim, shape sniffing, hex/base58 decoding)
//!     → mnemonic.rs (BIP-39 seed → BIP-32 / SLIP-0010 child key)
//!     → SecretBytes (32 bytes, zeroed on drop)
//!     → chains::* (curve + address encoding)
//! ```
//!
//! # Design Decisions
//! - Secrets never appear in logs; only the detected format is recorded
//! - 128-character hex is rejected instead of silently truncated
//! - Every rejection names the format that was attempted

pub mod curve;
pub mod digest;
pub mod mnemonic;
pub mod normalize;
pub mod types;

pub use mnemonic::DerivationPaths;
pub use types::{KeyError, KeyFormat, KeyResult, SecretBytes};

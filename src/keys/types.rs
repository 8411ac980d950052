//! Key material types and the derivation error taxonomy.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

/// Canonical 32-byte secret (secp256k1 scalar or ed25519 seed), zeroed on drop.
pub type SecretBytes = Zeroizing<[u8; 32]>;

/// Textual encoding a private key was supplied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyFormat {
    /// Chain-specific secret (`cosmospriv…`, Stellar `S…`, XRP family seed).
    ChainSecret,
    /// `0x`-prefixed hex.
    PrefixedHex,
    /// Bare hex.
    Hex,
    /// Base58 payload without chain framing.
    Base58,
    /// BIP-39 mnemonic phrase.
    Mnemonic,
}

impl KeyFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyFormat::ChainSecret => "chain_secret",
            KeyFormat::PrefixedHex => "prefixed_hex",
            KeyFormat::Hex => "hex",
            KeyFormat::Base58 => "base58",
            KeyFormat::Mnemonic => "mnemonic",
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while normalizing key input or deriving an identity.
///
/// Every variant is raised before any network access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("private key input is empty")]
    Empty,

    #[error("input looks like a {chain} address, not a private key")]
    LooksLikeAddress { chain: &'static str },

    #[error("input looks like a {chain} public key, not a private key")]
    LooksLikePublicKey { chain: &'static str },

    #[error("{format}: input contains non-hex characters")]
    InvalidHexCharacters { format: KeyFormat },

    #[error("{format}: expected {expected} hex characters, got {actual}")]
    InvalidHexLength {
        format: KeyFormat,
        expected: usize,
        actual: usize,
    },

    #[error("hex input has 128 characters; supply the 64-character private key instead")]
    DoubleLengthHex,

    #[error("{format}: base58 decoding failed: {reason}")]
    InvalidBase58 { format: KeyFormat, reason: String },

    #[error("{format}: base32 decoding failed")]
    InvalidBase32 { format: KeyFormat },

    #[error("{format}: decoded {actual} bytes, expected {expected}")]
    InvalidLength {
        format: KeyFormat,
        expected: &'static str,
        actual: usize,
    },

    #[error("{format}: checksum mismatch")]
    ChecksumMismatch { format: KeyFormat },

    #[error("{format}: unexpected version byte {found:#04x}")]
    InvalidVersion { format: KeyFormat, found: u8 },

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid derivation path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("secret is not a valid {curve} private key")]
    InvalidScalar { curve: &'static str },

    #[error("unrecognized {chain} private key format; accepted formats: {accepted}")]
    UnrecognizedFormat {
        chain: &'static str,
        accepted: &'static str,
    },

    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error("address encoding failed: {0}")]
    Encoding(String),
}

/// Result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;

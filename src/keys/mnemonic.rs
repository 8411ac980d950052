//! BIP-39 mnemonics and hierarchical derivation.
//!
//! # Responsibilities
//! - Validate a phrase against the English wordlist and expand it to a 64-byte seed
//! - Walk a BIP-32 path for secp256k1 chains
//! - Walk a SLIP-0010 path (hardened only) for ed25519 chains

use super::types::{KeyError, KeyResult, SecretBytes};
use bip32::{DerivationPath, XPrv};
use bip39::Mnemonic;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::str::FromStr;
use zeroize::{Zeroize, Zeroizing};

type HmacSha512 = Hmac<Sha512>;

/// Default account paths per chain.
pub struct DerivationPaths;

impl DerivationPaths {
    /// Cosmos SDK chains (coin type 118).
    pub const COSMOS: &'static str = "m/44'/118'/0'/0/0";
    /// Stellar, SEP-0005 (coin type 148, all hardened).
    pub const STELLAR: &'static str = "m/44'/148'/0'";
    /// XRP Ledger (coin type 144).
    pub const XRP: &'static str = "m/44'/144'/0'/0/0";
    /// Ethereum and EVM-compatible chains (coin type 60).
    pub const EVM: &'static str = "m/44'/60'/0'/0/0";
}

/// Expand a mnemonic phrase into a 64-byte BIP-39 seed.
///
/// Whitespace is normalized and case is folded before the checksum is verified.
///
/// # Arguments
/// * `phrase` - 12, 15, 18, 21 or 24 English words
/// * `passphrase` - Optional BIP-39 passphrase (the "25th word")
pub fn seed_from_phrase(phrase: &str, passphrase: Option<&str>) -> KeyResult<Zeroizing<[u8; 64]>> {
    let normalized = Zeroizing::new(
        phrase
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" "),
    );

    let mnemonic = Mnemonic::parse(normalized.as_str())
        .map_err(|e| KeyError::InvalidMnemonic(e.to_string()))?;

    Ok(Zeroizing::new(mnemonic.to_seed(passphrase.unwrap_or(""))))
}

/// Derive a secp256k1 private key from a seed along a BIP-32 path.
pub fn derive_secp256k1(seed: &[u8], path: &str) -> KeyResult<SecretBytes> {
    let derivation_path = DerivationPath::from_str(path).map_err(|e| KeyError::InvalidPath {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    let child = XPrv::derive_from_path(seed, &derivation_path)
        .map_err(|e| KeyError::Derivation(e.to_string()))?;

    let key_bytes: [u8; 32] = child.private_key().to_bytes().into();
    Ok(Zeroizing::new(key_bytes))
}

/// Derive an ed25519 seed from a BIP-39 seed along a SLIP-0010 path.
///
/// Every path segment must be hardened (`'` or `h` suffix).
pub fn derive_ed25519(seed: &[u8], path: &str) -> KeyResult<SecretBytes> {
    let indices = parse_hardened_path(path)?;

    let (mut key, mut chain_code) = hmac_split(b"ed25519 seed", &[seed])?;

    for index in indices {
        let hardened = index | 0x8000_0000;
        let (child_key, child_chain) =
            hmac_split(&chain_code, &[&[0x00], &key, &hardened.to_be_bytes()])?;
        key.zeroize();
        chain_code.zeroize();
        key = child_key;
        chain_code = child_chain;
    }

    chain_code.zeroize();
    Ok(Zeroizing::new(key))
}

/// HMAC-SHA512 over `parts`, split into (IL, IR).
fn hmac_split(key: &[u8], parts: &[&[u8]]) -> KeyResult<([u8; 32], [u8; 32])> {
    let mut mac = HmacSha512::new_from_slice(key)
        .map_err(|e| KeyError::Derivation(format!("HMAC init failed: {}", e)))?;
    for part in parts {
        mac.update(part);
    }
    let mut buf = Zeroizing::new([0u8; 64]);
    buf.copy_from_slice(&mac.finalize().into_bytes());

    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&buf[..32]);
    right.copy_from_slice(&buf[32..]);
    Ok((left, right))
}

fn parse_hardened_path(path: &str) -> KeyResult<Vec<u32>> {
    let invalid = |reason: String| KeyError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    let segments = path
        .trim()
        .strip_prefix("m/")
        .ok_or_else(|| invalid("path must start with 'm/'".to_string()))?;

    let mut indices = Vec::new();
    for segment in segments.split('/').filter(|s| !s.is_empty()) {
        let number = segment
            .strip_suffix('\'')
            .or_else(|| segment.strip_suffix('h'))
            .ok_or_else(|| invalid(format!("segment '{}' must be hardened", segment)))?;
        let index: u32 = number
            .parse()
            .map_err(|_| invalid(format!("segment '{}' is not a number", segment)))?;
        if index >= 0x8000_0000 {
            return Err(invalid(format!("index {} out of range", index)));
        }
        indices.push(index);
    }

    if indices.is_empty() {
        return Err(invalid("path has no segments".to_string()));
    }
    Ok(indices)
}

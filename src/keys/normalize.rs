//! Input normalization shared by every chain deriver.
//!
//! # Responsibilities
//! - Trim surrounding whitespace and reject empty input
//! - Decode 64-character hex (with or without `0x`) into 32 bytes
//! - Decode bare base58 payloads with a configurable alphabet
//! - Recognize mnemonic-shaped input before any other decoding is tried

use super::digest::double_sha256_checksum;
use super::types::{KeyError, KeyFormat, KeyResult, SecretBytes};
use zeroize::Zeroizing;

/// Bitcoin base58 alphabet, used for character-class checks.
pub const BITCOIN_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// XRP Ledger base58 alphabet.
pub const RIPPLE_ALPHABET: &str = "rpshnaf39wBUDNEGHJKLM4PQRST7VWXYZ2bcdeCg65jkm8oFqi1tuvAxyz";

/// Word counts accepted for BIP-39 phrases.
const MNEMONIC_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Trim whitespace, failing on empty input.
pub fn trim_input(input: &str) -> KeyResult<&str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(KeyError::Empty);
    }
    Ok(trimmed)
}

/// True if every character is an ASCII hex digit.
pub fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Split an optional `0x`/`0X` prefix, returning the detected hex format.
pub fn split_hex_prefix(input: &str) -> (KeyFormat, &str) {
    match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(rest) => (KeyFormat::PrefixedHex, rest),
        None => (KeyFormat::Hex, input),
    }
}

/// Decode a 32-byte secret from 64 hex characters, with or without `0x`.
///
/// 128-character input is rejected with [`KeyError::DoubleLengthHex`] rather than
/// truncated, since it is usually an ed25519 expanded key or a pasted keypair.
pub fn decode_hex_secret(input: &str) -> KeyResult<(SecretBytes, KeyFormat)> {
    let (format, digits) = split_hex_prefix(input);

    if !is_hex(digits) {
        return Err(KeyError::InvalidHexCharacters { format });
    }
    if digits.len() == 128 {
        return Err(KeyError::DoubleLengthHex);
    }
    if digits.len() != 64 {
        return Err(KeyError::InvalidHexLength {
            format,
            expected: 64,
            actual: digits.len(),
        });
    }

    let mut secret = Zeroizing::new([0u8; 32]);
    hex::decode_to_slice(digits, secret.as_mut_slice())
        .map_err(|_| KeyError::InvalidHexCharacters { format })?;
    Ok((secret, format))
}

/// Decode a bare base58 payload into a 32-byte secret.
///
/// Exactly 32 bytes are used as-is; longer payloads (a 64-byte keypair, for
/// example) contribute their first 32 bytes; shorter payloads are rejected.
pub fn decode_base58_secret(input: &str, alphabet: &bs58::Alphabet) -> KeyResult<SecretBytes> {
    let decoded = Zeroizing::new(
        bs58::decode(input)
            .with_alphabet(alphabet)
            .into_vec()
            .map_err(|e| KeyError::InvalidBase58 {
                format: KeyFormat::Base58,
                reason: e.to_string(),
            })?,
    );

    if decoded.len() < 32 {
        return Err(KeyError::InvalidLength {
            format: KeyFormat::Base58,
            expected: "at least 32",
            actual: decoded.len(),
        });
    }

    let mut secret = Zeroizing::new([0u8; 32]);
    secret.copy_from_slice(&decoded[..32]);
    Ok(secret)
}

/// Base58Check-encode `payload` (4-byte double-SHA256 checksum appended).
pub fn base58check_encode(payload: &[u8], alphabet: &bs58::Alphabet) -> String {
    let mut buf = Vec::with_capacity(payload.len() + 4);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&double_sha256_checksum(payload));
    bs58::encode(buf).with_alphabet(alphabet).into_string()
}

/// Decode a Base58Check string and verify its checksum, returning the payload.
pub fn base58check_decode(
    input: &str,
    alphabet: &bs58::Alphabet,
    format: KeyFormat,
) -> KeyResult<Zeroizing<Vec<u8>>> {
    let decoded = Zeroizing::new(
        bs58::decode(input)
            .with_alphabet(alphabet)
            .into_vec()
            .map_err(|e| KeyError::InvalidBase58 {
                format,
                reason: e.to_string(),
            })?,
    );

    if decoded.len() < 5 {
        return Err(KeyError::InvalidLength {
            format,
            expected: "at least 5",
            actual: decoded.len(),
        });
    }

    let (payload, checksum) = decoded.split_at(decoded.len() - 4);
    if double_sha256_checksum(payload) != checksum {
        return Err(KeyError::ChecksumMismatch { format });
    }
    Ok(Zeroizing::new(payload.to_vec()))
}

/// True if every character belongs to the given base58 alphabet string.
pub fn in_alphabet(input: &str, alphabet: &str) -> bool {
    !input.is_empty() && input.chars().all(|c| alphabet.contains(c))
}

/// True if the input has the shape of a BIP-39 phrase (word count and letters only).
///
/// Checksum validation happens later, in [`super::mnemonic::seed_from_phrase`].
pub fn looks_like_mnemonic(input: &str) -> bool {
    let words: Vec<&str> = input.split_whitespace().collect();
    MNEMONIC_WORD_COUNTS.contains(&words.len())
        && words
            .iter()
            .all(|w| w.chars().all(|c| c.is_ascii_alphabetic()))
}

//! XRP Ledger: family seeds, secp256k1 and ed25519 keys, classic addresses.
//!
//! # Responsibilities
//! - Decode `s…` family seeds and `sEd…` ed25519 seeds (Ripple base58check)
//! - Run the XRPL root/account generator to turn a family seed into a secp256k1 key
//! - Encode classic `r…` addresses from 33-byte public keys

use super::identity::{DerivedIdentity, KeyScheme, NormalizedKey};
use super::ChainDeriver;
use crate::keys::curve::{ed25519_public_key, secp256k1_public_key};
use crate::keys::digest::{hash160, sha512_half};
use crate::keys::mnemonic::{derive_secp256k1, seed_from_phrase};
use crate::keys::normalize::{
    base58check_decode, base58check_encode, decode_base58_secret, decode_hex_secret, in_alphabet,
    is_hex, looks_like_mnemonic, split_hex_prefix, trim_input, RIPPLE_ALPHABET,
};
use crate::keys::{DerivationPaths, KeyError, KeyFormat, KeyResult, SecretBytes};
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, Scalar};
use zeroize::Zeroizing;

const ACCEPTED: &str =
    "s… family seed, sEd… ed25519 seed, 64-char hex, 66-char hex with 00/ED prefix, BIP-39 mnemonic, base58";

/// Version byte of secp256k1 family seeds.
const FAMILY_SEED_VERSION: u8 = 0x21;
/// Version prefix of ed25519 seeds (renders as `sEd`).
const ED25519_SEED_PREFIX: [u8; 3] = [0x01, 0xE1, 0x4B];
/// Version byte of classic account addresses.
const ACCOUNT_ID_VERSION: u8 = 0x00;
/// Public key prefix marking ed25519 keys.
const ED25519_KEY_PREFIX: u8 = 0xED;

/// XRP Ledger account deriver.
#[derive(Debug, Clone, Copy, Default)]
pub struct XrpDeriver;

impl XrpDeriver {
    pub fn new() -> Self {
        Self
    }
}

/// Encode a 33-byte public key as a classic `r…` address.
pub fn encode_classic_address(public_key: &[u8]) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(ACCOUNT_ID_VERSION);
    payload.extend_from_slice(&hash160(public_key));
    base58check_encode(&payload, bs58::Alphabet::RIPPLE)
}

/// First scalar in `[1, n)` produced by SHA-512Half(prefix ‖ seq) for seq = 0, 1, …
fn first_valid_scalar(prefix: &[&[u8]]) -> KeyResult<Scalar> {
    for seq in 0..=u32::MAX {
        let seq_bytes = seq.to_be_bytes();
        let mut parts: Vec<&[u8]> = prefix.to_vec();
        parts.push(&seq_bytes);
        let candidate = Zeroizing::new(sha512_half(&parts));

        let scalar: Option<Scalar> = Scalar::from_repr(FieldBytes::from(*candidate)).into();
        if let Some(scalar) = scalar {
            if scalar != Scalar::ZERO {
                return Ok(scalar);
            }
        }
    }
    Err(KeyError::Derivation(
        "no valid secp256k1 scalar in sequence range".to_string(),
    ))
}

/// XRPL secp256k1 derivation: root key from seed entropy, then account 0.
fn secp256k1_from_entropy(entropy: &[u8]) -> KeyResult<SecretBytes> {
    let root = first_valid_scalar(&[entropy])?;
    let root_bytes = Zeroizing::new(<[u8; 32]>::from(root.to_repr()));
    let root_public = secp256k1_public_key(&root_bytes, true)?;

    let account_index = 0u32.to_be_bytes();
    let tweak = first_valid_scalar(&[&root_public, &account_index])?;

    let account = root + tweak;
    if account == Scalar::ZERO {
        return Err(KeyError::InvalidScalar { curve: "secp256k1" });
    }
    Ok(Zeroizing::new(account.to_repr().into()))
}

fn decode_family_seed(input: &str) -> KeyResult<NormalizedKey> {
    let format = KeyFormat::ChainSecret;
    let payload = base58check_decode(input, bs58::Alphabet::RIPPLE, format)?;

    if payload.len() == 19 && payload[..3] == ED25519_SEED_PREFIX {
        let secret = Zeroizing::new(sha512_half(&[&payload[3..]]));
        return Ok(NormalizedKey::new(secret, format, KeyScheme::Ed25519));
    }

    if payload.len() != 17 {
        return Err(KeyError::InvalidLength {
            format,
            expected: "17 (secp256k1) or 19 (ed25519)",
            actual: payload.len(),
        });
    }
    if payload[0] != FAMILY_SEED_VERSION {
        return Err(KeyError::InvalidVersion {
            format,
            found: payload[0],
        });
    }

    let secret = secp256k1_from_entropy(&payload[1..])?;
    Ok(NormalizedKey::new(secret, format, KeyScheme::Secp256k1))
}

/// 66-character hex in the XRPL key layout: `00` + secp256k1 key or `ED` + ed25519 key.
fn decode_prefixed_key(format: KeyFormat, digits: &str) -> KeyResult<NormalizedKey> {
    let (prefix, key) = digits.split_at(2);
    let scheme = match prefix.to_ascii_uppercase().as_str() {
        "00" => KeyScheme::Secp256k1,
        "ED" => KeyScheme::Ed25519,
        "02" | "03" => return Err(KeyError::LooksLikePublicKey { chain: "xrp" }),
        _ => {
            return Err(KeyError::InvalidHexLength {
                format,
                expected: 64,
                actual: digits.len(),
            })
        }
    };

    let mut secret = Zeroizing::new([0u8; 32]);
    hex::decode_to_slice(key, secret.as_mut_slice())
        .map_err(|_| KeyError::InvalidHexCharacters { format })?;
    Ok(NormalizedKey::new(secret, format, scheme))
}

impl ChainDeriver for XrpDeriver {
    fn chain(&self) -> &'static str {
        "xrp"
    }

    fn accepted_formats(&self) -> &'static str {
        ACCEPTED
    }

    fn normalize(&self, input: &str) -> KeyResult<NormalizedKey> {
        let input = trim_input(input)?;
        let ripple_chars = in_alphabet(input, RIPPLE_ALPHABET);

        if ripple_chars && input.starts_with('r') && (25..=35).contains(&input.len()) {
            return Err(KeyError::LooksLikeAddress { chain: "xrp" });
        }
        if ripple_chars && (input.starts_with('X') || input.starts_with('T')) && input.len() == 47
        {
            return Err(KeyError::LooksLikeAddress { chain: "xrp" });
        }
        if ripple_chars && input.starts_with('s') && (29..=31).contains(&input.len()) {
            return decode_family_seed(input);
        }

        let (hex_format, digits) = split_hex_prefix(input);
        if hex_format == KeyFormat::PrefixedHex || is_hex(digits) {
            if digits.len() == 66 && is_hex(digits) {
                return decode_prefixed_key(hex_format, digits);
            }
            let (secret, format) = decode_hex_secret(input)?;
            return Ok(NormalizedKey::new(secret, format, KeyScheme::Secp256k1));
        }

        if looks_like_mnemonic(input) {
            let seed = seed_from_phrase(input, None)?;
            let secret = derive_secp256k1(seed.as_slice(), DerivationPaths::XRP)?;
            return Ok(NormalizedKey::new(
                secret,
                KeyFormat::Mnemonic,
                KeyScheme::Secp256k1,
            ));
        }

        if ripple_chars {
            let secret = decode_base58_secret(input, bs58::Alphabet::RIPPLE)?;
            return Ok(NormalizedKey::new(
                secret,
                KeyFormat::Base58,
                KeyScheme::Secp256k1,
            ));
        }

        Err(KeyError::UnrecognizedFormat {
            chain: "xrp",
            accepted: ACCEPTED,
        })
    }

    fn identity(&self, key: &NormalizedKey) -> KeyResult<DerivedIdentity> {
        let public_key = match key.scheme {
            KeyScheme::Secp256k1 => secp256k1_public_key(&key.secret, true)?,
            KeyScheme::Ed25519 => {
                let mut prefixed = Vec::with_capacity(33);
                prefixed.push(ED25519_KEY_PREFIX);
                prefixed.extend_from_slice(&ed25519_public_key(&key.secret));
                prefixed
            }
        };

        Ok(DerivedIdentity::Xrp {
            format: key.format,
            algorithm: key.scheme,
            public_key: hex::encode_upper(&public_key),
            address: encode_classic_address(&public_key),
        })
    }
}

//! Stellar: ed25519 keys, StrKey (`S…` seeds, `G…` account ids).

use super::identity::{DerivedIdentity, KeyScheme, NormalizedKey};
use super::ChainDeriver;
use crate::keys::curve::ed25519_public_key;
use crate::keys::mnemonic::{derive_ed25519, seed_from_phrase};
use crate::keys::normalize::{
    decode_hex_secret, is_hex, looks_like_mnemonic, split_hex_prefix, trim_input,
};
use crate::keys::{DerivationPaths, KeyError, KeyFormat, KeyResult};
use zeroize::Zeroizing;

const ACCEPTED: &str = "S… secret seed, 0x-prefixed hex, 64-char hex, BIP-39 mnemonic";

/// StrKey version byte for ed25519 account ids (`G…`).
const VERSION_ACCOUNT_ID: u8 = 6 << 3;
/// StrKey version byte for ed25519 secret seeds (`S…`).
const VERSION_SEED: u8 = 18 << 3;

/// Length of an encoded 32-byte StrKey.
const STRKEY_LEN: usize = 56;
/// Length of an encoded muxed account (`M…`).
const MUXED_LEN: usize = 69;

const BASE32: base32::Alphabet = base32::Alphabet::RFC4648 { padding: false };

/// Stellar account deriver.
#[derive(Debug, Clone, Copy, Default)]
pub struct StellarDeriver;

impl StellarDeriver {
    pub fn new() -> Self {
        Self
    }
}

/// CRC16-XModem (poly 0x1021, init 0), the StrKey checksum.
fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Encode a 32-byte payload as a StrKey with the given version byte.
pub fn encode_strkey(version: u8, payload: &[u8; 32]) -> String {
    let mut buf = Vec::with_capacity(35);
    buf.push(version);
    buf.extend_from_slice(payload);
    let crc = crc16_xmodem(&buf);
    buf.extend_from_slice(&crc.to_le_bytes());
    base32::encode(BASE32, &buf)
}

/// Encode an ed25519 public key as a `G…` account id.
pub fn encode_account_id(public_key: &[u8; 32]) -> String {
    encode_strkey(VERSION_ACCOUNT_ID, public_key)
}

/// Decode an `S…` secret seed.
fn decode_secret_seed(input: &str) -> KeyResult<Zeroizing<[u8; 32]>> {
    let format = KeyFormat::ChainSecret;
    let decoded = Zeroizing::new(
        base32::decode(BASE32, input).ok_or(KeyError::InvalidBase32 { format })?,
    );

    if decoded.len() != 35 {
        return Err(KeyError::InvalidLength {
            format,
            expected: "35",
            actual: decoded.len(),
        });
    }
    if decoded[0] != VERSION_SEED {
        return Err(KeyError::InvalidVersion {
            format,
            found: decoded[0],
        });
    }

    let expected = crc16_xmodem(&decoded[..33]).to_le_bytes();
    if decoded[33..35] != expected {
        return Err(KeyError::ChecksumMismatch { format });
    }

    let mut seed = Zeroizing::new([0u8; 32]);
    seed.copy_from_slice(&decoded[1..33]);
    Ok(seed)
}

impl ChainDeriver for StellarDeriver {
    fn chain(&self) -> &'static str {
        "stellar"
    }

    fn accepted_formats(&self) -> &'static str {
        ACCEPTED
    }

    fn normalize(&self, input: &str) -> KeyResult<NormalizedKey> {
        let input = trim_input(input)?;

        if (input.starts_with('G') && input.len() == STRKEY_LEN)
            || (input.starts_with('M') && input.len() == MUXED_LEN)
        {
            return Err(KeyError::LooksLikeAddress { chain: "stellar" });
        }

        if input.starts_with('S') && input.len() == STRKEY_LEN {
            let seed = decode_secret_seed(input)?;
            return Ok(NormalizedKey::new(
                seed,
                KeyFormat::ChainSecret,
                KeyScheme::Ed25519,
            ));
        }

        let (hex_format, digits) = split_hex_prefix(input);
        if hex_format == KeyFormat::PrefixedHex || is_hex(digits) {
            let (secret, format) = decode_hex_secret(input)?;
            return Ok(NormalizedKey::new(secret, format, KeyScheme::Ed25519));
        }

        if looks_like_mnemonic(input) {
            let seed = seed_from_phrase(input, None)?;
            let secret = derive_ed25519(seed.as_slice(), DerivationPaths::STELLAR)?;
            return Ok(NormalizedKey::new(
                secret,
                KeyFormat::Mnemonic,
                KeyScheme::Ed25519,
            ));
        }

        Err(KeyError::UnrecognizedFormat {
            chain: "stellar",
            accepted: ACCEPTED,
        })
    }

    fn identity(&self, key: &NormalizedKey) -> KeyResult<DerivedIdentity> {
        let public_key = ed25519_public_key(&key.secret);
        Ok(DerivedIdentity::Stellar {
            format: key.format,
            public_key: hex::encode(public_key),
            address: encode_account_id(&public_key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC8032_SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const RFC8032_SECRET: &str = "SCOWDMM5576VUYF2QRFPJEXMFTCEISOFNF5TE2IZOA52YAY4VZ7WBQNO";
    const RFC8032_ACCOUNT: &str = "GDLVVGABQKYQVN6VJP7NHSLEA45A5YLS6PNKMIZFV4BBU2HXA5IRVHUR";

    #[test]
    fn test_crc16_xmodem_check_value() {
        assert_eq!(crc16_xmodem(b"123456789"), 0x31c3);
    }

    #[test]
    fn test_secret_seed_and_hex_agree() {
        let deriver = StellarDeriver::new();
        let from_seed = deriver.derive(RFC8032_SECRET).unwrap();
        let from_hex = deriver.derive(RFC8032_SEED).unwrap();

        assert_eq!(from_seed.address(), RFC8032_ACCOUNT);
        assert_eq!(from_hex.address(), RFC8032_ACCOUNT);
        assert_eq!(
            from_seed.public_key(),
            "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a"
        );
        assert_eq!(from_seed.format(), KeyFormat::ChainSecret);
    }

    #[test]
    fn test_seed_encoding_roundtrip() {
        let mut seed = [0u8; 32];
        hex::decode_to_slice(RFC8032_SEED, &mut seed).unwrap();
        assert_eq!(encode_strkey(VERSION_SEED, &seed), RFC8032_SECRET);
    }

    #[test]
    fn test_sep0005_vector_one() {
        let identity = StellarDeriver::new()
            .derive("illness spike retreat truth genius clock brain pass fit cave bargain toe")
            .unwrap();
        assert_eq!(
            identity.address(),
            "GDRXE2BQUC3AZNPVFSCEZ76NJ3WWL25FYFK6RGZGIEKWE4SOOHSUJUJ6"
        );
    }

    #[test]
    fn test_rejects_account_ids() {
        assert_eq!(
            StellarDeriver::new().derive(RFC8032_ACCOUNT),
            Err(KeyError::LooksLikeAddress { chain: "stellar" })
        );
        let muxed = format!("M{}", "A".repeat(68));
        assert_eq!(
            StellarDeriver::new().derive(&muxed),
            Err(KeyError::LooksLikeAddress { chain: "stellar" })
        );
    }

    #[test]
    fn test_corrupted_seed_fails_checksum() {
        let mut corrupted: Vec<char> = RFC8032_SECRET.chars().collect();
        corrupted[10] = if corrupted[10] == 'A' { 'B' } else { 'A' };
        let corrupted: String = corrupted.into_iter().collect();
        assert_eq!(
            StellarDeriver::new().derive(&corrupted),
            Err(KeyError::ChecksumMismatch {
                format: KeyFormat::ChainSecret
            })
        );
    }

    #[test]
    fn test_unrecognized_lists_formats() {
        let err = StellarDeriver::new().derive("definitely-not-a-key").unwrap_err();
        assert!(err.to_string().contains("S… secret seed"));
    }
}

//! EVM-compatible chains: secp256k1 keys, EIP-55 addresses.

use super::identity::{DerivedIdentity, KeyScheme, NormalizedKey};
use super::ChainDeriver;
use crate::keys::curve::secp256k1_public_key;
use crate::keys::mnemonic::{derive_secp256k1, seed_from_phrase};
use crate::keys::normalize::{
    decode_hex_secret, is_hex, looks_like_mnemonic, split_hex_prefix, trim_input,
};
use crate::keys::{DerivationPaths, KeyError, KeyFormat, KeyResult};
use alloy::primitives::{keccak256, Address};

const ACCEPTED: &str = "0x-prefixed hex, 64-char hex, BIP-39 mnemonic";

/// Deriver for an EVM network. The network name only labels the output;
/// every EVM chain shares the same key and address scheme.
#[derive(Debug, Clone, Copy)]
pub struct EvmDeriver {
    network: &'static str,
}

impl EvmDeriver {
    pub const fn new(network: &'static str) -> Self {
        Self { network }
    }

    pub fn ethereum() -> Self {
        Self::new("ethereum")
    }

    pub fn network(&self) -> &'static str {
        self.network
    }
}

/// Address for a 65-byte uncompressed SEC1 public key.
pub fn address_from_uncompressed(public_key: &[u8]) -> Address {
    let hash = keccak256(&public_key[1..]);
    Address::from_slice(&hash[12..])
}

impl ChainDeriver for EvmDeriver {
    fn chain(&self) -> &'static str {
        "evm"
    }

    fn accepted_formats(&self) -> &'static str {
        ACCEPTED
    }

    fn normalize(&self, input: &str) -> KeyResult<NormalizedKey> {
        let input = trim_input(input)?;
        let (hex_format, digits) = split_hex_prefix(input);

        if hex_format == KeyFormat::PrefixedHex || is_hex(digits) {
            if is_hex(digits) {
                if digits.len() == 40 {
                    return Err(KeyError::LooksLikeAddress { chain: "evm" });
                }
                let compressed_pubkey =
                    digits.len() == 66 && (digits.starts_with("02") || digits.starts_with("03"));
                let uncompressed_pubkey = digits.len() == 130 && digits.starts_with("04");
                if compressed_pubkey || uncompressed_pubkey {
                    return Err(KeyError::LooksLikePublicKey { chain: "evm" });
                }
            }
            let (secret, format) = decode_hex_secret(input)?;
            return Ok(NormalizedKey::new(secret, format, KeyScheme::Secp256k1));
        }

        if looks_like_mnemonic(input) {
            let seed = seed_from_phrase(input, None)?;
            let secret = derive_secp256k1(seed.as_slice(), DerivationPaths::EVM)?;
            return Ok(NormalizedKey::new(
                secret,
                KeyFormat::Mnemonic,
                KeyScheme::Secp256k1,
            ));
        }

        Err(KeyError::UnrecognizedFormat {
            chain: "evm",
            accepted: ACCEPTED,
        })
    }

    fn identity(&self, key: &NormalizedKey) -> KeyResult<DerivedIdentity> {
        let compressed = secp256k1_public_key(&key.secret, true)?;
        let uncompressed = secp256k1_public_key(&key.secret, false)?;
        let address = address_from_uncompressed(&uncompressed);

        Ok(DerivedIdentity::Evm {
            network: self.network.to_string(),
            format: key.format,
            public_key: format!("0x{}", hex::encode(&compressed)),
            public_key_uncompressed: format!("0x{}", hex::encode(&uncompressed)),
            address: address.to_checksum(None),
        })
    }
}

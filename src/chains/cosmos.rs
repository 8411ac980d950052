//! Cosmos-SDK chains: secp256k1 keys, bech32 account addresses.

use super::identity::{DerivedIdentity, KeyScheme, NormalizedKey};
use super::ChainDeriver;
use crate::keys::curve::secp256k1_public_key;
use crate::keys::digest::hash160;
use crate::keys::mnemonic::{derive_secp256k1, seed_from_phrase};
use crate::keys::normalize::{
    decode_base58_secret, decode_hex_secret, in_alphabet, is_hex, looks_like_mnemonic,
    split_hex_prefix, trim_input, BITCOIN_ALPHABET,
};
use crate::keys::{DerivationPaths, KeyError, KeyFormat, KeyResult};
use bech32::{ToBase32, Variant};
use zeroize::Zeroizing;

const ACCEPTED: &str =
    "<hrp>priv… base58 secret, 0x-prefixed hex, 64-char hex, BIP-39 mnemonic, base58";

/// Deriver for one Cosmos-SDK chain, identified by its bech32 prefix.
#[derive(Debug, Clone, Copy)]
pub struct CosmosDeriver {
    hrp: &'static str,
}

impl CosmosDeriver {
    pub const fn new(hrp: &'static str) -> Self {
        Self { hrp }
    }

    pub fn cosmos_hub() -> Self {
        Self::new("cosmos")
    }

    pub fn hrp(&self) -> &'static str {
        self.hrp
    }

    /// Encode a 20-byte account hash as a bech32 address for this chain.
    pub fn encode_address(&self, account_hash: &[u8]) -> KeyResult<String> {
        bech32::encode(self.hrp, account_hash.to_base32(), Variant::Bech32)
            .map_err(|e| KeyError::Encoding(e.to_string()))
    }

    /// Extract the 32-byte key from a `<hrp>priv` payload.
    ///
    /// Two layouts exist: a 41-byte form with the key at bytes 4..36, and the
    /// 37-byte amino form (4-byte type prefix, length byte 0x20, key).
    fn decode_priv(&self, payload: &str) -> KeyResult<NormalizedKey> {
        let format = KeyFormat::ChainSecret;
        let decoded = Zeroizing::new(
            bs58::decode(payload)
                .with_alphabet(bs58::Alphabet::BITCOIN)
                .into_vec()
                .map_err(|e| KeyError::InvalidBase58 {
                    format,
                    reason: e.to_string(),
                })?,
        );

        let key_bytes = match decoded.len() {
            41 => &decoded[4..36],
            37 => {
                if decoded[4] != 0x20 {
                    return Err(KeyError::InvalidVersion {
                        format,
                        found: decoded[4],
                    });
                }
                &decoded[5..37]
            }
            actual => {
                return Err(KeyError::InvalidLength {
                    format,
                    expected: "37 or 41",
                    actual,
                })
            }
        };

        let mut secret = Zeroizing::new([0u8; 32]);
        secret.copy_from_slice(key_bytes);
        Ok(NormalizedKey::new(secret, format, KeyScheme::Secp256k1))
    }
}

impl ChainDeriver for CosmosDeriver {
    fn chain(&self) -> &'static str {
        "cosmos"
    }

    fn accepted_formats(&self) -> &'static str {
        ACCEPTED
    }

    fn normalize(&self, input: &str) -> KeyResult<NormalizedKey> {
        let input = trim_input(input)?;
        let rest = input.strip_prefix(self.hrp).unwrap_or("");

        if !rest.is_empty() {
            if rest.starts_with("pub") {
                return Err(KeyError::LooksLikePublicKey { chain: "cosmos" });
            }
            if let Some(payload) = rest.strip_prefix("priv") {
                return self.decode_priv(payload);
            }
            if rest.starts_with('1') {
                return Err(KeyError::LooksLikeAddress { chain: "cosmos" });
            }
        }

        let (hex_format, digits) = split_hex_prefix(input);
        if hex_format == KeyFormat::PrefixedHex || is_hex(digits) {
            let (secret, format) = decode_hex_secret(input)?;
            return Ok(NormalizedKey::new(secret, format, KeyScheme::Secp256k1));
        }

        if looks_like_mnemonic(input) {
            let seed = seed_from_phrase(input, None)?;
            let secret = derive_secp256k1(seed.as_slice(), DerivationPaths::COSMOS)?;
            return Ok(NormalizedKey::new(
                secret,
                KeyFormat::Mnemonic,
                KeyScheme::Secp256k1,
            ));
        }

        if in_alphabet(input, BITCOIN_ALPHABET) {
            let secret = decode_base58_secret(input, bs58::Alphabet::BITCOIN)?;
            return Ok(NormalizedKey::new(
                secret,
                KeyFormat::Base58,
                KeyScheme::Secp256k1,
            ));
        }

        Err(KeyError::UnrecognizedFormat {
            chain: "cosmos",
            accepted: ACCEPTED,
        })
    }

    fn identity(&self, key: &NormalizedKey) -> KeyResult<DerivedIdentity> {
        let compressed = secp256k1_public_key(&key.secret, true)?;
        let uncompressed = secp256k1_public_key(&key.secret, false)?;
        let address = self.encode_address(&hash160(&compressed))?;

        Ok(DerivedIdentity::Cosmos {
            hrp: self.hrp.to_string(),
            format: key.format,
            public_key: hex::encode(&compressed),
            public_key_uncompressed: hex::encode(&uncompressed),
            address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn test_scalar_one_golden_values() {
        let identity = CosmosDeriver::cosmos_hub().derive(KEY_ONE).unwrap();
        match identity {
            DerivedIdentity::Cosmos {
                hrp,
                format,
                public_key,
                public_key_uncompressed,
                address,
            } => {
                assert_eq!(hrp, "cosmos");
                assert_eq!(format, KeyFormat::Hex);
                assert_eq!(
                    public_key,
                    "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
                );
                assert!(public_key_uncompressed.starts_with("0479be667ef9dcbbac55a06295ce870b"));
                assert!(public_key_uncompressed.ends_with("9c47d08ffb10d4b8"));
                assert_eq!(address, "cosmos1w508d6qejxtdg4y5r3zarvary0c5xw7k6ah60c");
            }
            other => panic!("unexpected identity {:?}", other),
        }
    }

    #[test]
    fn test_hrp_changes_address_only() {
        let hub = CosmosDeriver::new("cosmos").derive(KEY_ONE).unwrap();
        let osmo = CosmosDeriver::new("osmo").derive(KEY_ONE).unwrap();
        assert_eq!(hub.public_key(), osmo.public_key());
        assert_eq!(osmo.address(), "osmo1w508d6qejxtdg4y5r3zarvary0c5xw7kjxy2e2");
    }

    #[test]
    fn test_prefixed_hex_is_stable() {
        let deriver = CosmosDeriver::cosmos_hub();
        let a = deriver.derive(&format!("0x{}", KEY_ONE)).unwrap();
        let b = deriver.derive(&format!("  {}\n", KEY_ONE)).unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(a.format(), KeyFormat::PrefixedHex);
        assert_eq!(b.format(), KeyFormat::Hex);
    }

    #[test]
    fn test_cosmospriv_layouts() {
        let deriver = CosmosDeriver::cosmos_hub();
        let long = deriver
            .derive("cosmosprivtciYA4edWLFx59xhdfKHGuoNQUH6nWcoSVpMpqpbTXYK8rJGdHUp4Nk8")
            .unwrap();
        let amino = deriver
            .derive("cosmospriv8ZiS5nZEPVgWb1QMUsEPF922hjdUqdjDeGLusWWmrPMtdnav85e")
            .unwrap();
        assert_eq!(long.address(), "cosmos1w508d6qejxtdg4y5r3zarvary0c5xw7k6ah60c");
        assert_eq!(amino.address(), long.address());
        assert_eq!(long.format(), KeyFormat::ChainSecret);
    }

    #[test]
    fn test_rejects_address_and_pubkey() {
        let deriver = CosmosDeriver::cosmos_hub();
        assert_eq!(
            deriver.derive("cosmos1w508d6qejxtdg4y5r3zarvary0c5xw7k6ah60c"),
            Err(KeyError::LooksLikeAddress { chain: "cosmos" })
        );
        assert_eq!(
            deriver.derive("cosmospub1addwnpepqd87l8xhcnrrtzxnkql7k55ph8fr9jarf4hn6udwukfprlalu8lgw0urza0"),
            Err(KeyError::LooksLikePublicKey { chain: "cosmos" })
        );
    }

    #[test]
    fn test_mnemonic_derivation() {
        let identity = CosmosDeriver::cosmos_hub()
            .derive("abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about")
            .unwrap();
        assert_eq!(identity.format(), KeyFormat::Mnemonic);
        assert_eq!(identity.address(), "cosmos19rl4cm2hmr8afy4kldpxz3fka4jguq0auqdal4");
    }

    #[test]
    fn test_base58_fallback() {
        // 64-byte keypair payload; the first 32 bytes are scalar one
        let identity = CosmosDeriver::cosmos_hub()
            .derive("1111111111111111111111111111111JhkSVu1fw8pMYiXyHGTjEMCrxc7jTesqPucvGajxkHWE")
            .unwrap();
        assert_eq!(identity.format(), KeyFormat::Base58);
        assert_eq!(identity.address(), "cosmos1w508d6qejxtdg4y5r3zarvary0c5xw7k6ah60c");
    }

    #[test]
    fn test_errors() {
        let deriver = CosmosDeriver::cosmos_hub();
        assert_eq!(deriver.derive(""), Err(KeyError::Empty));
        assert_eq!(
            deriver.derive(&format!("{}{}", KEY_ONE, KEY_ONE)),
            Err(KeyError::DoubleLengthHex)
        );
        assert!(matches!(
            deriver.derive("not a key!"),
            Err(KeyError::UnrecognizedFormat { chain: "cosmos", .. })
        ));
        assert_eq!(
            deriver.derive(&"0".repeat(64)),
            Err(KeyError::InvalidScalar { curve: "secp256k1" })
        );
    }
}

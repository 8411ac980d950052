//! Derived public identity, one variant per chain family.

use crate::keys::{KeyFormat, SecretBytes};
use serde::Serialize;

/// Signature scheme a secret belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScheme {
    Secp256k1,
    Ed25519,
}

/// A secret after input normalization, before any public data is computed.
pub struct NormalizedKey {
    pub secret: SecretBytes,
    pub format: KeyFormat,
    pub scheme: KeyScheme,
}

impl NormalizedKey {
    pub fn new(secret: SecretBytes, format: KeyFormat, scheme: KeyScheme) -> Self {
        Self {
            secret,
            format,
            scheme,
        }
    }
}

impl std::fmt::Debug for NormalizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizedKey")
            .field("secret", &"[REDACTED]")
            .field("format", &self.format)
            .field("scheme", &self.scheme)
            .finish()
    }
}

/// Public identity derived from a private key.
///
/// Serialized as `{"chain": "cosmos", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "chain", rename_all = "snake_case")]
pub enum DerivedIdentity {
    Cosmos {
        hrp: String,
        format: KeyFormat,
        /// Compressed SEC1 public key, hex.
        public_key: String,
        /// Uncompressed SEC1 public key, hex.
        public_key_uncompressed: String,
        address: String,
    },
    Stellar {
        format: KeyFormat,
        /// Raw ed25519 public key, hex.
        public_key: String,
        /// `G…` account id.
        address: String,
    },
    Xrp {
        format: KeyFormat,
        algorithm: KeyScheme,
        /// 33-byte public key, upper-case hex (`ED…` for ed25519).
        public_key: String,
        /// Classic `r…` address.
        address: String,
    },
    Evm {
        network: String,
        format: KeyFormat,
        public_key: String,
        public_key_uncompressed: String,
        /// EIP-55 checksummed address.
        address: String,
    },
}

impl DerivedIdentity {
    pub fn address(&self) -> &str {
        match self {
            DerivedIdentity::Cosmos { address, .. }
            | DerivedIdentity::Stellar { address, .. }
            | DerivedIdentity::Xrp { address, .. }
            | DerivedIdentity::Evm { address, .. } => address,
        }
    }

    pub fn public_key(&self) -> &str {
        match self {
            DerivedIdentity::Cosmos { public_key, .. }
            | DerivedIdentity::Stellar { public_key, .. }
            | DerivedIdentity::Xrp { public_key, .. }
            | DerivedIdentity::Evm { public_key, .. } => public_key,
        }
    }

    pub fn format(&self) -> KeyFormat {
        match self {
            DerivedIdentity::Cosmos { format, .. }
            | DerivedIdentity::Stellar { format, .. }
            | DerivedIdentity::Xrp { format, .. }
            | DerivedIdentity::Evm { format, .. } => *format,
        }
    }

    pub fn chain(&self) -> &'static str {
        match self {
            DerivedIdentity::Cosmos { .. } => "cosmos",
            DerivedIdentity::Stellar { .. } => "stellar",
            DerivedIdentity::Xrp { .. } => "xrp",
            DerivedIdentity::Evm { .. } => "evm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_chain_tag() {
        let identity = DerivedIdentity::Xrp {
            format: KeyFormat::ChainSecret,
            algorithm: KeyScheme::Ed25519,
            public_key: "ED00".to_string(),
            address: "rTest".to_string(),
        };
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["chain"], "xrp");
        assert_eq!(json["algorithm"], "ed25519");
        assert_eq!(json["format"], "chain_secret");
        assert_eq!(identity.address(), "rTest");
    }

    #[test]
    fn test_normalized_key_debug_redacts_secret() {
        let mut secret = SecretBytes::new([0u8; 32]);
        secret[0] = 0xab;
        let key = NormalizedKey::new(secret, KeyFormat::Hex, KeyScheme::Secp256k1);
        let printed = format!("{:?}", key);
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains("171"));
    }
}

//! Public key computation for the two supported curves.

use super::types::{KeyError, KeyResult};
use k256::elliptic_curve::sec1::ToEncodedPoint;

/// Parse a 32-byte secp256k1 scalar, rejecting zero and values ≥ n.
pub fn secp256k1_secret(secret: &[u8; 32]) -> KeyResult<k256::SecretKey> {
    k256::SecretKey::from_slice(secret).map_err(|_| KeyError::InvalidScalar {
        curve: "secp256k1",
    })
}

/// SEC1 encoding of the secp256k1 public key (33 bytes compressed, 65 uncompressed).
pub fn secp256k1_public_key(secret: &[u8; 32], compressed: bool) -> KeyResult<Vec<u8>> {
    let secret_key = secp256k1_secret(secret)?;
    Ok(secret_key
        .public_key()
        .to_encoded_point(compressed)
        .as_bytes()
        .to_vec())
}

/// 32-byte ed25519 public key for a 32-byte seed.
pub fn ed25519_public_key(seed: &[u8; 32]) -> [u8; 32] {
    ed25519_dalek::SigningKey::from_bytes(seed)
        .verifying_key()
        .to_bytes()
}

//! Hash compositions shared by the address encoders.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};

/// RIPEMD160(SHA256(data)), the account hash used by Cosmos and the XRP Ledger.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let mut out = [0u8; 20];
    out.copy_from_slice(&Ripemd160::digest(sha));
    out
}

/// First four bytes of SHA256(SHA256(payload)).
pub fn double_sha256_checksum(payload: &[u8]) -> [u8; 4] {
    let digest = Sha256::digest(Sha256::digest(payload));
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// First 32 bytes of SHA-512 over the concatenated parts (XRPL "SHA-512Half").
pub fn sha512_half(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    out
}

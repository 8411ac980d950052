//! Web3 Secret Storage (v3) decryption.
//!
//! `dk = KDF(password)`, `mac = keccak256(dk[16..32] ‖ ciphertext)`,
//! `plaintext = AES-128-CTR(dk[0..16], iv, ciphertext)`. The MAC is checked
//! in constant time before any plaintext is produced.

use aes::Aes128;
use alloy::primitives::keccak256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::keystore::types::{DecryptedSecret, Kdf, KeystoreError, KeystoreResult, Web3Keystore};

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// Run the keystore's KDF over `password`.
pub fn derive_key(kdf: &Kdf, password: &str) -> KeystoreResult<Zeroizing<Vec<u8>>> {
    match kdf {
        Kdf::Pbkdf2 { rounds, dklen, salt } => {
            let mut dk = Zeroizing::new(vec![0u8; *dklen]);
            pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, *rounds, &mut dk);
            Ok(dk)
        }
        Kdf::Scrypt {
            log_n,
            r,
            p,
            dklen,
            salt,
        } => {
            let params = scrypt::Params::new(*log_n, *r, *p, *dklen)
                .map_err(|e| KeystoreError::InvalidKdfParams(format!("scrypt: {}", e)))?;
            let mut dk = Zeroizing::new(vec![0u8; *dklen]);
            scrypt::scrypt(password.as_bytes(), salt, &params, &mut dk)
                .map_err(|e| KeystoreError::InvalidKdfParams(format!("scrypt: {}", e)))?;
            Ok(dk)
        }
    }
}

/// Decrypt a v3 keystore.
///
/// # Arguments
/// * `keystore` - Parsed keystore
/// * `password` - Keystore password
///
/// # Returns
/// The plaintext private key, or `MacMismatch` for a wrong password.
pub fn decrypt(keystore: &Web3Keystore, password: &str) -> KeystoreResult<DecryptedSecret> {
    let dk = derive_key(&keystore.kdf, password)?;

    let mut mac_input = Zeroizing::new(Vec::with_capacity(16 + keystore.ciphertext.len()));
    mac_input.extend_from_slice(&dk[16..32]);
    mac_input.extend_from_slice(&keystore.ciphertext);
    let computed = keccak256(mac_input.as_slice());

    if !bool::from(computed.as_slice().ct_eq(&keystore.mac)) {
        tracing::debug!(kdf = keystore.kdf.name(), "Keystore MAC mismatch");
        return Err(KeystoreError::MacMismatch);
    }

    let mut plaintext = keystore.ciphertext.clone();
    let mut cipher = Aes128Ctr::new_from_slices(&dk[..16], &keystore.iv)
        .map_err(|e| KeystoreError::Decryption(e.to_string()))?;
    cipher.apply_keystream(&mut plaintext);

    tracing::debug!(kdf = keystore.kdf.name(), "Web3 keystore decrypted");
    Ok(DecryptedSecret::new(plaintext))
}

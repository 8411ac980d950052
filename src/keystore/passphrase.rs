//! OpenSSL / CryptoJS "Salted__" passphrase decryption.
//!
//! Key and IV come from `EVP_BytesToKey(MD5, 1 iteration)`; the cipher is
//! AES-256-CBC with PKCS#7 padding. The format carries no MAC, so a wrong
//! password is detected by the padding check and by requiring UTF-8 output.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use md5::{Digest, Md5};
use zeroize::Zeroizing;

use crate::keystore::types::{DecryptedSecret, KeystoreError, KeystoreResult, PassphraseKeystore};

type Aes256CbcDec = cbc::Decryptor<Aes256>;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

/// OpenSSL's `EVP_BytesToKey` with MD5 and a single iteration.
///
/// Returns `key ‖ iv` (48 bytes).
pub fn evp_bytes_to_key(password: &[u8], salt: &[u8; 8]) -> Zeroizing<Vec<u8>> {
    let mut derived = Zeroizing::new(Vec::with_capacity(KEY_LEN + IV_LEN + 16));
    let mut previous: Option<[u8; 16]> = None;

    while derived.len() < KEY_LEN + IV_LEN {
        let mut hasher = Md5::new();
        if let Some(block) = previous {
            hasher.update(block);
        }
        hasher.update(password);
        hasher.update(salt);
        let block: [u8; 16] = hasher.finalize().into();
        derived.extend_from_slice(&block);
        previous = Some(block);
    }

    derived.truncate(KEY_LEN + IV_LEN);
    derived
}

/// Decrypt a passphrase blob.
///
/// # Returns
/// The UTF-8 plaintext, or `Decryption` when padding or encoding checks fail.
pub fn decrypt(keystore: &PassphraseKeystore, password: &str) -> KeystoreResult<DecryptedSecret> {
    let derived = evp_bytes_to_key(password.as_bytes(), &keystore.salt);
    let cipher = Aes256CbcDec::new_from_slices(&derived[..KEY_LEN], &derived[KEY_LEN..])
        .map_err(|e| KeystoreError::Decryption(e.to_string()))?;

    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&keystore.ciphertext)
        .map_err(|_| KeystoreError::Decryption("bad padding: wrong password or corrupted data".to_string()))?;
    let secret = DecryptedSecret::new(plaintext);

    if secret.is_empty() {
        return Err(KeystoreError::Decryption("empty plaintext".to_string()));
    }
    if secret.as_utf8().is_none() {
        return Err(KeystoreError::Decryption(
            "plaintext is not UTF-8: wrong password or corrupted data".to_string(),
        ));
    }

    tracing::debug!("Passphrase keystore decrypted");
    Ok(secret)
}

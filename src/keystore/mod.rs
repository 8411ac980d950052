//! Encrypted keystore decryption.
//!
//! # Data Flow
//! ```text
//! keystore JSON + password
//!     → types.rs (Keystore::from_json: Web3 v3 or passphrase blob)
//!     → web3.rs (PBKDF2/scrypt → MAC check → AES-128-CTR)
//!       passphrase.rs (EVP_BytesToKey → AES-256-CBC/PKCS#7 → UTF-8 check)
//!     → DecryptedSecret (zeroized on drop)
//! ```
//!
//! Keystores are only ever read; this module never writes one.

pub mod passphrase;
pub mod types;
pub mod web3;

pub use types::{
    DecryptedSecret, Kdf, Keystore, KeystoreError, KeystoreResult, PassphraseKeystore,
    Web3Keystore,
};

/// Decrypt any supported keystore.
pub fn decrypt(keystore: &Keystore, password: &str) -> KeystoreResult<DecryptedSecret> {
    match keystore {
        Keystore::Web3(web3) => web3::decrypt(web3, password),
        Keystore::Passphrase(blob) => passphrase::decrypt(blob, password),
    }
}

/// Parse and decrypt a keystore document in one step.
pub fn decrypt_json(document: &str, password: &str) -> KeystoreResult<DecryptedSecret> {
    let keystore = Keystore::from_json(document)?;
    tracing::debug!(kind = keystore.kind(), "Keystore parsed");
    decrypt(&keystore, password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrypt_json_dispatches_by_kind() {
        let web3 = r#"{"crypto": {
            "cipher": "aes-128-ctr",
            "ciphertext": "4acb14054e44f3ad57a365ad86089ba51ef97a289e61937a864f19b682f4098a",
            "cipherparams": {"iv": "101112131415161718191a1b1c1d1e1f"},
            "kdf": "scrypt",
            "kdfparams": {"n": 1024, "r": 8, "p": 1, "dklen": 32,
                          "salt": "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"},
            "mac": "0a18e3592cfd57079e0c00cfc2bd93cdf1966a821d23a2ab5aea22ca8d0547ee"
        }}"#;
        let secret = decrypt_json(web3, "correct horse battery staple").unwrap();
        assert!(secret.secret_key().is_some());

        let passphrase = r#"{"cipher": "aes", "ciphertext": "U2FsdGVkX18BAgMEBQYHCDDZgl6nTGYvsEssMwin00qLy+/lcS4zmUOfJ23iRxMVdOc++V5dCGLY9aw2cCM6GWBUIIA8FMJbuf5fDWBzInI="}"#;
        let secret = decrypt_json(passphrase, "hunter2").unwrap();
        assert!(secret.as_utf8().unwrap().starts_with('S'));
    }
}

//! Keystore document model and errors.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeystoreError {
    #[error("Malformed keystore: {0}")]
    Malformed(String),

    #[error("Unsupported cipher '{0}' (expected aes-128-ctr)")]
    UnsupportedCipher(String),

    #[error("Unsupported KDF '{0}' (expected pbkdf2 with hmac-sha256, or scrypt)")]
    UnsupportedKdf(String),

    #[error("Invalid KDF parameters: {0}")]
    InvalidKdfParams(String),

    /// The derived key does not authenticate the ciphertext: wrong password or tampered file.
    #[error("MAC mismatch: wrong password or corrupted keystore")]
    MacMismatch,

    /// Padding or encoding check failed after decryption.
    #[error("Decryption failed: {0}")]
    Decryption(String),
}

pub type KeystoreResult<T> = Result<T, KeystoreError>;

/// Key derivation function and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kdf {
    /// PBKDF2-HMAC-SHA256.
    Pbkdf2 { rounds: u32, dklen: usize, salt: Vec<u8> },
    Scrypt {
        log_n: u8,
        r: u32,
        p: u32,
        dklen: usize,
        salt: Vec<u8>,
    },
}

impl Kdf {
    pub fn name(&self) -> &'static str {
        match self {
            Kdf::Pbkdf2 { .. } => "pbkdf2",
            Kdf::Scrypt { .. } => "scrypt",
        }
    }
}

/// Web3 Secret Storage (v3) encrypted key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Web3Keystore {
    pub ciphertext: Vec<u8>,
    /// AES-128-CTR initial counter block.
    pub iv: [u8; 16],
    pub kdf: Kdf,
    pub mac: Vec<u8>,
    /// Unverified address hint some wallets include.
    pub address: Option<String>,
}

/// OpenSSL / CryptoJS passphrase blob: base64 of `Salted__ ‖ salt(8) ‖ ciphertext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassphraseKeystore {
    pub salt: [u8; 8],
    pub ciphertext: Vec<u8>,
}

/// A parsed keystore document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keystore {
    Web3(Web3Keystore),
    Passphrase(PassphraseKeystore),
}

impl Keystore {
    pub fn kind(&self) -> &'static str {
        match self {
            Keystore::Web3(_) => "web3",
            Keystore::Passphrase(_) => "passphrase",
        }
    }
}

/// Decrypted key material. Zeroed on drop.
pub struct DecryptedSecret {
    bytes: Zeroizing<Vec<u8>>,
}

impl DecryptedSecret {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase hex of the raw bytes.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.bytes.as_slice()))
    }

    /// The plaintext as text, if it is valid UTF-8.
    pub fn as_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// The plaintext as a 32-byte private key, if it is exactly 32 bytes.
    pub fn secret_key(&self) -> Option<Zeroizing<[u8; 32]>> {
        let bytes: [u8; 32] = self.bytes.as_slice().try_into().ok()?;
        Some(Zeroizing::new(bytes))
    }
}

impl fmt::Debug for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptedSecret")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct RawCipherParams {
    iv: String,
}

#[derive(Deserialize)]
struct RawWeb3 {
    cipher: String,
    ciphertext: String,
    cipherparams: RawCipherParams,
    kdf: String,
    kdfparams: Value,
    mac: String,
}

#[derive(Deserialize)]
struct RawPbkdf2Params {
    c: u32,
    dklen: usize,
    #[serde(default)]
    prf: Option<String>,
    salt: String,
}

#[derive(Deserialize)]
struct RawScryptParams {
    n: u64,
    r: u32,
    p: u32,
    dklen: usize,
    salt: String,
}

/// Base64 of `Salted__`.
const SALTED_PREFIX_B64: &str = "U2FsdGVkX1";

fn decode_hex_field(field: &str, value: &str) -> KeystoreResult<Vec<u8>> {
    let value = value.trim();
    hex::decode(value.strip_prefix("0x").unwrap_or(value))
        .map_err(|e| KeystoreError::Malformed(format!("{} is not hex: {}", field, e)))
}

/// Upper bounds on work factors read from untrusted keystore files.
const MAX_PBKDF2_ROUNDS: u32 = 10_000_000;
const MAX_SCRYPT_LOG_N: u32 = 20;
const MAX_SCRYPT_R_TIMES_P: u64 = 64;
/// scrypt needs `128 * r * n` bytes.
const MAX_SCRYPT_MEMORY: u64 = 1 << 30;

fn check_dklen(dklen: usize) -> KeystoreResult<()> {
    if !(32..=64).contains(&dklen) {
        return Err(KeystoreError::InvalidKdfParams(format!(
            "dklen must be between 32 and 64, got {}",
            dklen
        )));
    }
    Ok(())
}

fn check_scrypt_cost(n: u64, r: u32, p: u32) -> KeystoreResult<()> {
    if n.trailing_zeros() > MAX_SCRYPT_LOG_N {
        return Err(KeystoreError::InvalidKdfParams(format!(
            "n must be at most 2^{}, got {}",
            MAX_SCRYPT_LOG_N, n
        )));
    }
    let rp = r as u64 * p as u64;
    if rp == 0 || rp > MAX_SCRYPT_R_TIMES_P {
        return Err(KeystoreError::InvalidKdfParams(format!(
            "r * p must be between 1 and {}, got r={} p={}",
            MAX_SCRYPT_R_TIMES_P, r, p
        )));
    }
    if 128 * r as u64 * n > MAX_SCRYPT_MEMORY {
        return Err(KeystoreError::InvalidKdfParams(format!(
            "scrypt would need {} bytes of memory",
            128 * r as u64 * n
        )));
    }
    Ok(())
}

fn parse_kdf(name: &str, params: Value) -> KeystoreResult<Kdf> {
    match name.to_lowercase().as_str() {
        "pbkdf2" => {
            let raw: RawPbkdf2Params = serde_json::from_value(params)
                .map_err(|e| KeystoreError::InvalidKdfParams(e.to_string()))?;
            let prf = raw.prf.as_deref().unwrap_or("hmac-sha256");
            if prf != "hmac-sha256" {
                return Err(KeystoreError::UnsupportedKdf(format!("pbkdf2/{}", prf)));
            }
            if raw.c == 0 || raw.c > MAX_PBKDF2_ROUNDS {
                return Err(KeystoreError::InvalidKdfParams(format!(
                    "c must be between 1 and {}, got {}",
                    MAX_PBKDF2_ROUNDS, raw.c
                )));
            }
            check_dklen(raw.dklen)?;
            Ok(Kdf::Pbkdf2 {
                rounds: raw.c,
                dklen: raw.dklen,
                salt: decode_hex_field("kdfparams.salt", &raw.salt)?,
            })
        }
        "scrypt" => {
            let raw: RawScryptParams = serde_json::from_value(params)
                .map_err(|e| KeystoreError::InvalidKdfParams(e.to_string()))?;
            if raw.n < 2 || !raw.n.is_power_of_two() {
                return Err(KeystoreError::InvalidKdfParams(format!(
                    "n must be a power of two greater than 1, got {}",
                    raw.n
                )));
            }
            check_scrypt_cost(raw.n, raw.r, raw.p)?;
            check_dklen(raw.dklen)?;
            Ok(Kdf::Scrypt {
                log_n: raw.n.trailing_zeros() as u8,
                r: raw.r,
                p: raw.p,
                dklen: raw.dklen,
                salt: decode_hex_field("kdfparams.salt", &raw.salt)?,
            })
        }
        other => Err(KeystoreError::UnsupportedKdf(other.to_string())),
    }
}

fn parse_web3(section: &Value, address: Option<String>) -> KeystoreResult<Web3Keystore> {
    let raw: RawWeb3 = serde_json::from_value(section.clone())
        .map_err(|e| KeystoreError::Malformed(e.to_string()))?;
    if !raw.cipher.eq_ignore_ascii_case("aes-128-ctr") {
        return Err(KeystoreError::UnsupportedCipher(raw.cipher));
    }

    let iv: [u8; 16] = decode_hex_field("cipherparams.iv", &raw.cipherparams.iv)?
        .try_into()
        .map_err(|iv: Vec<u8>| {
            KeystoreError::Malformed(format!("cipherparams.iv must be 16 bytes, got {}", iv.len()))
        })?;

    Ok(Web3Keystore {
        ciphertext: decode_hex_field("ciphertext", &raw.ciphertext)?,
        iv,
        kdf: parse_kdf(&raw.kdf, raw.kdfparams)?,
        mac: decode_hex_field("mac", &raw.mac)?,
        address,
    })
}

/// Parse a passphrase blob (the base64 text itself).
pub fn parse_passphrase_blob(blob: &str) -> KeystoreResult<PassphraseKeystore> {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let compact: String = blob.split_whitespace().collect();
    let raw = STANDARD
        .decode(compact)
        .map_err(|e| KeystoreError::Malformed(format!("ciphertext is not base64: {}", e)))?;
    if raw.len() < 32 || &raw[..8] != b"Salted__" {
        return Err(KeystoreError::Malformed(
            "ciphertext is not an OpenSSL salted blob".to_string(),
        ));
    }
    if (raw.len() - 16) % 16 != 0 {
        return Err(KeystoreError::Malformed(
            "ciphertext is not a whole number of AES blocks".to_string(),
        ));
    }

    let mut salt = [0u8; 8];
    salt.copy_from_slice(&raw[8..16]);
    Ok(PassphraseKeystore {
        salt,
        ciphertext: raw[16..].to_vec(),
    })
}

impl Keystore {
    /// Parse a keystore JSON document.
    ///
    /// Web3 fields may sit at the top level or under `crypto` / `Crypto`.
    /// A document whose `ciphertext` is a salted base64 blob, with no cipher
    /// or `cipher = "aes"`, is a passphrase keystore.
    pub fn from_json(document: &str) -> KeystoreResult<Self> {
        let doc: Value = serde_json::from_str(document)
            .map_err(|e| KeystoreError::Malformed(format!("invalid JSON: {}", e)))?;
        if !doc.is_object() {
            return Err(KeystoreError::Malformed("expected a JSON object".to_string()));
        }

        let section = doc
            .get("crypto")
            .or_else(|| doc.get("Crypto"))
            .filter(|section| section.is_object())
            .unwrap_or(&doc);

        let cipher = section.get("cipher").and_then(Value::as_str);
        let ciphertext = section.get("ciphertext").and_then(Value::as_str);

        match (cipher, ciphertext) {
            (None | Some("aes"), Some(blob)) if blob.trim_start().starts_with(SALTED_PREFIX_B64) => {
                parse_passphrase_blob(blob).map(Keystore::Passphrase)
            }
            (Some(_), Some(_)) => {
                let address = doc.get("address").and_then(Value::as_str).map(str::to_string);
                parse_web3(section, address).map(Keystore::Web3)
            }
            (_, None) => Err(KeystoreError::Malformed("missing ciphertext".to_string())),
            (None, Some(_)) => Err(KeystoreError::Malformed("missing cipher".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PBKDF2_DOC: &str = r#"{
        "version": 3,
        "address": "f39fd6e51aad88f6f4ce6ab8827279cfffb92266",
        "crypto": {
            "cipher": "aes-128-ctr",
            "ciphertext": "c3d5f142438f9cec0bdfb2947b9c419fb1a682884b4536f31d17c535a6094b07",
            "cipherparams": {"iv": "101112131415161718191a1b1c1d1e1f"},
            "kdf": "pbkdf2",
            "kdfparams": {"c": 1024, "dklen": 32, "prf": "hmac-sha256",
                          "salt": "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"},
            "mac": "972033df10972fa36d84005db95e0245aa4b452704638a2e4ab373c79d0abd18"
        }
    }"#;

    #[test]
    fn test_parse_nested_web3() {
        let keystore = Keystore::from_json(PBKDF2_DOC).unwrap();
        let Keystore::Web3(web3) = keystore else {
            panic!("expected web3 keystore");
        };
        assert_eq!(web3.kdf.name(), "pbkdf2");
        assert_eq!(web3.iv[0], 0x10);
        assert_eq!(web3.ciphertext.len(), 32);
        assert_eq!(web3.address.as_deref(), Some("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
    }

    #[test]
    fn test_parse_capitalized_and_top_level() {
        let capitalized = PBKDF2_DOC.replace("\"crypto\"", "\"Crypto\"");
        assert!(matches!(Keystore::from_json(&capitalized), Ok(Keystore::Web3(_))));

        let top_level = r#"{
            "cipher": "aes-128-ctr", "ciphertext": "00", "cipherparams": {"iv": "000102030405060708090a0b0c0d0e0f"},
            "kdf": "scrypt", "kdfparams": {"n": 1024, "r": 8, "p": 1, "dklen": 32, "salt": "00"}, "mac": "00"
        }"#;
        let Ok(Keystore::Web3(web3)) = Keystore::from_json(top_level) else {
            panic!("expected web3 keystore");
        };
        assert!(matches!(web3.kdf, Kdf::Scrypt { log_n: 10, r: 8, p: 1, .. }));
    }

    #[test]
    fn test_parse_passphrase_document() {
        let doc = r#"{"ciphertext": "U2FsdGVkX18BAgMEBQYHCDDZgl6nTGYvsEssMwin00qLy+/lcS4zmUOfJ23iRxMVdOc++V5dCGLY9aw2cCM6GWBUIIA8FMJbuf5fDWBzInI="}"#;
        let Ok(Keystore::Passphrase(blob)) = Keystore::from_json(doc) else {
            panic!("expected passphrase keystore");
        };
        assert_eq!(blob.salt, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(blob.ciphertext.len(), 64);
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(Keystore::from_json("[]"), Err(KeystoreError::Malformed(_))));
        assert!(matches!(Keystore::from_json("{}"), Err(KeystoreError::Malformed(_))));

        let cbc = PBKDF2_DOC.replace("aes-128-ctr", "aes-128-cbc");
        assert_eq!(
            Keystore::from_json(&cbc),
            Err(KeystoreError::UnsupportedCipher("aes-128-cbc".to_string()))
        );

        let sha512 = PBKDF2_DOC.replace("hmac-sha256", "hmac-sha512");
        assert!(matches!(Keystore::from_json(&sha512), Err(KeystoreError::UnsupportedKdf(_))));

        let bad_dklen = PBKDF2_DOC.replace("\"dklen\": 32", "\"dklen\": 16");
        assert!(matches!(Keystore::from_json(&bad_dklen), Err(KeystoreError::InvalidKdfParams(_))));

        let bad_iv = PBKDF2_DOC.replace("101112131415161718191a1b1c1d1e1f", "1011");
        assert!(matches!(Keystore::from_json(&bad_iv), Err(KeystoreError::Malformed(_))));
    }

    #[test]
    fn test_scrypt_n_must_be_power_of_two() {
        let err = parse_kdf("scrypt", serde_json::json!({"n": 1000, "r": 8, "p": 1, "dklen": 32, "salt": "00"}));
        assert!(matches!(err, Err(KeystoreError::InvalidKdfParams(_))));
    }

    #[test]
    fn test_kdf_work_factors_are_capped() {
        let scrypt = |n: u64, r: u32, p: u32| {
            parse_kdf("scrypt", serde_json::json!({"n": n, "r": r, "p": p, "dklen": 32, "salt": "00"}))
        };
        assert!(scrypt(262_144, 8, 1).is_ok());
        assert!(matches!(scrypt(1 << 40, 8, 1), Err(KeystoreError::InvalidKdfParams(_))));
        assert!(matches!(scrypt(1 << 10, 0, 1), Err(KeystoreError::InvalidKdfParams(_))));
        assert!(matches!(scrypt(1 << 10, 8, 1_000_000), Err(KeystoreError::InvalidKdfParams(_))));
        // 128 * 64 * 2^20 bytes is over the memory cap.
        assert!(matches!(scrypt(1 << 20, 64, 1), Err(KeystoreError::InvalidKdfParams(_))));

        let pbkdf2 = |c: u32| {
            parse_kdf("pbkdf2", serde_json::json!({"c": c, "dklen": 32, "prf": "hmac-sha256", "salt": "00"}))
        };
        assert!(pbkdf2(262_144).is_ok());
        assert!(matches!(pbkdf2(4_000_000_000), Err(KeystoreError::InvalidKdfParams(_))));
        assert!(matches!(pbkdf2(0), Err(KeystoreError::InvalidKdfParams(_))));
    }

    #[test]
    fn test_decrypted_secret_views() {
        let secret = DecryptedSecret::new(vec![0xab; 32]);
        assert_eq!(secret.to_hex().as_str(), "ab".repeat(32));
        assert!(secret.secret_key().is_some());
        assert!(secret.as_utf8().is_none());
        assert_eq!(format!("{:?}", secret), "DecryptedSecret { len: 32, .. }");

        let text = DecryptedSecret::new(b"hello".to_vec());
        assert_eq!(text.as_utf8(), Some("hello"));
        assert!(text.secret_key().is_none());
    }
}

//! Key derivation through the currency registry, including keys unlocked
//! from keystore files.

use std::io::Write;

use wallet_catalog::currency;
use wallet_catalog::keys::{KeyError, KeyFormat};
use wallet_catalog::keystore;

const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

// PBKDF2 Web3 v3 keystore of Anvil's first account, password "correct horse battery staple".
const WEB3_KEYSTORE: &str = r#"{
    "version": 3,
    "id": "3198bc9c-6672-5ab3-d995-4942343ae5b6",
    "crypto": {
        "cipher": "aes-128-ctr",
        "cipherparams": { "iv": "101112131415161718191a1b1c1d1e1f" },
        "ciphertext": "c3d5f142438f9cec0bdfb2947b9c419fb1a682884b4536f31d17c535a6094b07",
        "kdf": "pbkdf2",
        "kdfparams": {
            "c": 1024,
            "dklen": 32,
            "prf": "hmac-sha256",
            "salt": "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"
        },
        "mac": "972033df10972fa36d84005db95e0245aa4b452704638a2e4ab373c79d0abd18"
    }
}"#;

// Stellar secret seed encrypted as an OpenSSL salted blob, password "hunter2".
const PASSPHRASE_KEYSTORE: &str = r#"{"cipher": "aes", "ciphertext": "U2FsdGVkX18BAgMEBQYHCDDZgl6nTGYvsEssMwin00qLy+/lcS4zmUOfJ23iRxMVdOc++V5dCGLY9aw2cCM6GWBUIIA8FMJbuf5fDWBzInI="}"#;

#[test]
fn test_scalar_one_across_registry() {
    let cases = [
        ("ATOM", "cosmos1w508d6qejxtdg4y5r3zarvary0c5xw7k6ah60c"),
        ("OSMO", "osmo1w508d6qejxtdg4y5r3zarvary0c5xw7kjxy2e2"),
        ("ETH", "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"),
        ("BNB", "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"),
        ("XRP", "rBgGZ9tc4him9KBzD8fKFiQz3fSZpaSwMH"),
    ];
    for (ticker, address) in cases {
        let descriptor = currency::find(ticker).unwrap();
        let identity = descriptor.derive(KEY_ONE).unwrap();
        assert_eq!(identity.address(), address, "{}", ticker);

        let again = descriptor.derive(&format!("0x{}", KEY_ONE)).unwrap();
        assert_eq!(again.address(), address, "{} with 0x prefix", ticker);
        assert_eq!(again.public_key(), identity.public_key());
    }
}

#[test]
fn test_rejections_happen_before_derivation() {
    let atom = currency::find("atom").unwrap();
    assert_eq!(
        atom.derive(&format!("{}{}", KEY_ONE, KEY_ONE)),
        Err(KeyError::DoubleLengthHex)
    );
    assert!(matches!(
        atom.derive("cosmos1w508d6qejxtdg4y5r3zarvary0c5xw7k6ah60c"),
        Err(KeyError::LooksLikeAddress { .. })
    ));
    assert!(atom.derive("zz00000000000000000000000000000000000000000000000000000000000001").is_err());

    let eth = currency::find("ETH").unwrap();
    assert!(matches!(
        eth.derive("0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"),
        Err(KeyError::LooksLikeAddress { .. }) | Err(KeyError::InvalidHexLength { .. })
    ));
    assert!(currency::find("XRP").unwrap().derive("   ").is_err());
}

#[test]
fn test_explorer_links_embed_input_verbatim() {
    for descriptor in currency::all() {
        let link = descriptor.block_explorer_link("not-even-an-address");
        assert!(link.contains("not-even-an-address"), "{}", descriptor.ticker);
        assert!(url::Url::parse(&link).is_ok(), "{}", link);

        let tx = descriptor.transaction_link("ABC123");
        assert!(tx.contains("ABC123"), "{}", descriptor.ticker);
        assert!(url::Url::parse(&tx).is_ok(), "{}", tx);
    }
}

#[test]
fn test_web3_keystore_file_unlocks_evm_identity() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(WEB3_KEYSTORE.as_bytes()).unwrap();

    let document = std::fs::read_to_string(file.path()).unwrap();
    let secret = keystore::decrypt_json(&document, "correct horse battery staple").unwrap();
    assert_eq!(secret.len(), 32);

    let identity = currency::find("ETH").unwrap().derive(&secret.to_hex()).unwrap();
    assert_eq!(identity.address(), "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    assert_eq!(identity.format(), KeyFormat::Hex);

    assert_eq!(
        keystore::decrypt_json(&document, "wrong").unwrap_err(),
        keystore::KeystoreError::MacMismatch
    );
}

#[test]
fn test_passphrase_keystore_unlocks_stellar_identity() {
    let secret = keystore::decrypt_json(PASSPHRASE_KEYSTORE, "hunter2").unwrap();
    let seed = secret.as_utf8().unwrap();
    assert!(seed.starts_with('S'));

    let identity = currency::find("XLM").unwrap().derive(seed).unwrap();
    assert_eq!(identity.format(), KeyFormat::ChainSecret);
    assert!(identity.address().starts_with('G'));
    assert_eq!(identity.address().len(), 56);

    // Same seed, same identity.
    let again = currency::find("XLM").unwrap().derive(seed).unwrap();
    assert_eq!(again, identity);
}

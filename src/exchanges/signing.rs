//! Request signers for authenticated exchange endpoints.
//!
//! Pure functions: they take the secret and the exact bytes the exchange
//! expects to be signed and return the encoded signature.
//!
//! | Exchange | MAC         | Key               | Output |
//! |----------|-------------|-------------------|--------|
//! | Binance  | HMAC-SHA256 | secret as UTF-8   | hex    |
//! | Kraken   | HMAC-SHA512 | base64-decoded    | base64 |
//! | Coinbase | HMAC-SHA256 | base64-decoded    | base64 |
//! | Bitfinex | HMAC-SHA384 | secret as UTF-8   | hex    |
//! | Gate.io  | HMAC-SHA512 | secret as UTF-8   | hex    |

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::exchanges::types::{ExchangeError, ExchangeResult};

fn invalid_key(exchange: &'static str) -> ExchangeError {
    ExchangeError::InvalidSecret {
        exchange,
        reason: "HMAC rejected the key".to_string(),
    }
}

fn hmac_sha256(exchange: &'static str, key: &[u8], parts: &[&[u8]]) -> ExchangeResult<Vec<u8>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).map_err(|_| invalid_key(exchange))?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hmac_sha384(exchange: &'static str, key: &[u8], parts: &[&[u8]]) -> ExchangeResult<Vec<u8>> {
    let mut mac = Hmac::<Sha384>::new_from_slice(key).map_err(|_| invalid_key(exchange))?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hmac_sha512(exchange: &'static str, key: &[u8], parts: &[&[u8]]) -> ExchangeResult<Vec<u8>> {
    let mut mac = Hmac::<Sha512>::new_from_slice(key).map_err(|_| invalid_key(exchange))?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}

fn decode_base64_secret(exchange: &'static str, secret: &str) -> ExchangeResult<Vec<u8>> {
    STANDARD
        .decode(secret.trim())
        .map_err(|e| ExchangeError::InvalidSecret {
            exchange,
            reason: format!("secret is not base64: {}", e),
        })
}

/// Binance: hex HMAC-SHA256 of the full URL-encoded query string.
///
/// # Arguments
/// * `secret` - API secret
/// * `query` - Query string including `timestamp` and `recvWindow`, without `signature`
pub fn binance_signature(secret: &str, query: &str) -> ExchangeResult<String> {
    hmac_sha256("binance", secret.as_bytes(), &[query.as_bytes()]).map(hex::encode)
}

/// Kraken: base64 HMAC-SHA512 of `uri_path ‖ SHA256(nonce ‖ post_data)`.
///
/// # Arguments
/// * `secret` - Base64 API secret
/// * `uri_path` - e.g. `/0/private/Balance`
/// * `nonce` - The nonce also sent in `post_data`
/// * `post_data` - URL-encoded form body
pub fn kraken_signature(secret: &str, uri_path: &str, nonce: &str, post_data: &str) -> ExchangeResult<String> {
    let key = decode_base64_secret("kraken", secret)?;
    let inner = Sha256::new()
        .chain_update(nonce.as_bytes())
        .chain_update(post_data.as_bytes())
        .finalize();
    hmac_sha512("kraken", &key, &[uri_path.as_bytes(), inner.as_slice()]).map(|mac| STANDARD.encode(mac))
}

/// Coinbase Exchange: base64 HMAC-SHA256 of `timestamp ‖ METHOD ‖ request_path ‖ body`.
pub fn coinbase_signature(
    secret: &str,
    timestamp: &str,
    method: &str,
    request_path: &str,
    body: &str,
) -> ExchangeResult<String> {
    let key = decode_base64_secret("coinbase", secret)?;
    hmac_sha256(
        "coinbase",
        &key,
        &[
            timestamp.as_bytes(),
            method.to_uppercase().as_bytes(),
            request_path.as_bytes(),
            body.as_bytes(),
        ],
    )
    .map(|mac| STANDARD.encode(mac))
}

/// Bitfinex v2: hex HMAC-SHA384 of `/api/ ‖ path ‖ nonce ‖ body`.
///
/// # Arguments
/// * `api_path` - Path below `/api/`, e.g. `v2/auth/r/wallets`
pub fn bitfinex_signature(secret: &str, api_path: &str, nonce: &str, body: &str) -> ExchangeResult<String> {
    let api_path = api_path.trim_start_matches('/');
    hmac_sha384(
        "bitfinex",
        secret.as_bytes(),
        &["/api/".as_bytes(), api_path.as_bytes(), nonce.as_bytes(), body.as_bytes()],
    )
    .map(hex::encode)
}

/// Gate.io v4: hex HMAC-SHA512 of `METHOD\nPATH\nQUERY\nhex(SHA512(body))\nTIMESTAMP`.
pub fn gateio_signature(
    secret: &str,
    method: &str,
    path: &str,
    query: &str,
    body: &str,
    timestamp: &str,
) -> ExchangeResult<String> {
    let body_hash = hex::encode(Sha512::digest(body.as_bytes()));
    let payload = format!(
        "{}\n{}\n{}\n{}\n{}",
        method.to_uppercase(),
        path,
        query,
        body_hash,
        timestamp
    );
    hmac_sha512("gateio", secret.as_bytes(), &[payload.as_bytes()]).map(hex::encode)
}

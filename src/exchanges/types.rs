//! Shared exchange types, errors and the client trait.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::config::schema::ExchangeConfig;

/// Errors returned by exchange clients.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// A private endpoint was called without credentials. Raised before any I/O.
    #[error("{exchange}: {operation} requires API credentials")]
    MissingCredentials {
        exchange: &'static str,
        operation: &'static str,
    },

    #[error("{exchange} does not support {operation}")]
    Unsupported {
        exchange: &'static str,
        operation: &'static str,
    },

    /// The configured secret cannot key the exchange's HMAC (e.g. not base64).
    #[error("{exchange}: invalid API secret: {reason}")]
    InvalidSecret {
        exchange: &'static str,
        reason: String,
    },

    #[error("{exchange}: request failed: {source}")]
    Transport {
        exchange: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx status or an error envelope in the response body.
    #[error("{exchange} API error{}: {message}", status_suffix(.status))]
    Api {
        exchange: &'static str,
        status: Option<u16>,
        message: String,
    },

    /// The response parsed but did not have the expected shape.
    #[error("{exchange}: unexpected response: {message}")]
    Decode {
        exchange: &'static str,
        message: String,
    },

    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("unknown exchange '{0}' (expected binance, kraken, coinbase, bitfinex or gateio)")]
    UnknownExchange(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 24h ticker snapshot. Prices are the decimal strings the exchange reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticker {
    pub symbol: String,
    pub last_price: String,
    pub bid: String,
    pub ask: String,
    pub volume_24h: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceLevel {
    pub price: String,
    pub amount: String,
}

/// Order book, best price first on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct OrderBook {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl OrderBook {
    /// Keep at most `depth` levels per side.
    pub fn truncate(mut self, depth: usize) -> Self {
        self.bids.truncate(depth);
        self.asks.truncate(depth);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetBalance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

/// API credentials for private endpoints.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub passphrase: Option<String>,
}

impl Credentials {
    /// Credentials from config, if both key and secret are present.
    pub fn from_config(config: &ExchangeConfig) -> Option<Self> {
        match (&config.api_key, &config.api_secret) {
            (Some(api_key), Some(api_secret)) => Some(Self {
                api_key: api_key.clone(),
                api_secret: api_secret.clone(),
                passphrase: config.passphrase.clone(),
            }),
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Thin client over one exchange's REST API.
///
/// No call retries; every request carries the configured timeouts.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    fn name(&self) -> &'static str;

    /// Exchange clock in milliseconds since the Unix epoch.
    async fn server_time(&self) -> ExchangeResult<u64> {
        Err(ExchangeError::Unsupported {
            exchange: self.name(),
            operation: "server_time",
        })
    }

    /// # Arguments
    /// * `symbol` - Trading pair in any common spelling (`BTC/USDT`, `btc-usdt`, `BTCUSDT`)
    async fn ticker(&self, symbol: &str) -> ExchangeResult<Ticker>;

    async fn order_book(&self, symbol: &str, depth: usize) -> ExchangeResult<OrderBook>;

    /// Non-zero account balances. Requires credentials.
    async fn balances(&self) -> ExchangeResult<Vec<AssetBalance>>;
}

/// Uppercase a pair and split it into base and quote on `/`, `-` or `_`.
pub(crate) fn split_pair(symbol: &str) -> (String, Option<String>) {
    let upper = symbol.trim().to_uppercase();
    match upper.split_once(['/', '-', '_']) {
        Some((base, quote)) => (base.to_string(), Some(quote.to_string())),
        None => (upper, None),
    }
}

/// Concatenated pair without separator, e.g. `BTCUSDT`.
pub(crate) fn joined_pair(symbol: &str) -> String {
    match split_pair(symbol) {
        (base, Some(quote)) => format!("{}{}", base, quote),
        (base, None) => base,
    }
}

/// True for decimal strings like `0`, `0.00000000`.
pub(crate) fn is_zero_decimal(value: &str) -> bool {
    let trimmed = value.trim_start_matches('-');
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '0' || c == '.')
}

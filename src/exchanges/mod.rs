//! Exchange REST API clients.
//!
//! # Data Flow
//! ```text
//! CLI command (ticker / book / balances)
//!     → build_client(kind, config)
//!     → <exchange>.rs (endpoint paths, symbol spelling, response shapes)
//!     → signing.rs (HMAC for private endpoints)
//!     → http.rs (timeouts, status and error-envelope mapping, metrics)
//! ```
//!
//! # Design Decisions
//! - Prices and amounts stay the decimal strings the exchange sent
//! - Missing credentials fail before any network I/O
//! - No retries: a failed call surfaces to the caller as-is

pub mod binance;
pub mod bitfinex;
pub mod coinbase;
pub mod gateio;
pub mod http;
pub mod kraken;
pub mod signing;
pub mod types;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::config::schema::{ExchangeConfig, HttpConfig};

pub use binance::BinanceClient;
pub use bitfinex::BitfinexClient;
pub use coinbase::CoinbaseClient;
pub use gateio::GateioClient;
pub use kraken::KrakenClient;
pub use types::{
    AssetBalance, Credentials, ExchangeClient, ExchangeError, ExchangeResult, OrderBook,
    PriceLevel, Ticker,
};

/// Supported exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeKind {
    Binance,
    Kraken,
    Coinbase,
    Bitfinex,
    Gateio,
}

impl ExchangeKind {
    pub const ALL: [ExchangeKind; 5] = [
        ExchangeKind::Binance,
        ExchangeKind::Kraken,
        ExchangeKind::Coinbase,
        ExchangeKind::Bitfinex,
        ExchangeKind::Gateio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeKind::Binance => "binance",
            ExchangeKind::Kraken => "kraken",
            ExchangeKind::Coinbase => "coinbase",
            ExchangeKind::Bitfinex => "bitfinex",
            ExchangeKind::Gateio => "gateio",
        }
    }
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeKind {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binance" => Ok(ExchangeKind::Binance),
            "kraken" => Ok(ExchangeKind::Kraken),
            "coinbase" => Ok(ExchangeKind::Coinbase),
            "bitfinex" => Ok(ExchangeKind::Bitfinex),
            "gateio" | "gate" | "gate.io" => Ok(ExchangeKind::Gateio),
            _ => Err(ExchangeError::UnknownExchange(s.to_string())),
        }
    }
}

/// Build a client for `kind`.
///
/// # Arguments
/// * `kind` - Which exchange
/// * `config` - Credentials and base URL override (`None` for public-only use)
/// * `http` - Shared timeouts and User-Agent
pub fn build_client(
    kind: ExchangeKind,
    config: Option<&ExchangeConfig>,
    http: &HttpConfig,
) -> ExchangeResult<Box<dyn ExchangeClient>> {
    let default_config = ExchangeConfig::default();
    let config = config.unwrap_or(&default_config);

    let client: Box<dyn ExchangeClient> = match kind {
        ExchangeKind::Binance => Box::new(BinanceClient::new(config, http)?),
        ExchangeKind::Kraken => Box::new(KrakenClient::new(config, http)?),
        ExchangeKind::Coinbase => Box::new(CoinbaseClient::new(config, http)?),
        ExchangeKind::Bitfinex => Box::new(BitfinexClient::new(config, http)?),
        ExchangeKind::Gateio => Box::new(GateioClient::new(config, http)?),
    };
    tracing::debug!(exchange = kind.as_str(), authenticated = config.api_key.is_some(), "Exchange client built");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_kind_parsing() {
        for kind in ExchangeKind::ALL {
            assert_eq!(kind.as_str().parse::<ExchangeKind>().unwrap(), kind);
        }
        assert_eq!("Gate.io".parse::<ExchangeKind>().unwrap(), ExchangeKind::Gateio);
        assert!(matches!(
            "mtgox".parse::<ExchangeKind>(),
            Err(ExchangeError::UnknownExchange(_))
        ));
    }

    #[test]
    fn test_build_every_client() {
        let http = HttpConfig::default();
        for kind in ExchangeKind::ALL {
            let client = build_client(kind, None, &http).unwrap();
            assert_eq!(client.name(), kind.as_str());
        }
    }
}

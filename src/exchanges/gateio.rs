//! Gate.io v4 spot REST client.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::schema::{ExchangeConfig, HttpConfig};
use crate::exchanges::http::{self, HttpTransport};
use crate::exchanges::signing;
use crate::exchanges::types::{
    is_zero_decimal, split_pair, AssetBalance, Credentials, ExchangeClient, ExchangeError,
    ExchangeResult, OrderBook, Ticker,
};

pub const DEFAULT_BASE_URL: &str = "https://api.gateio.ws/api/v4";
const NAME: &str = "gateio";

/// `{"label": "INVALID_CURRENCY", "message": "..."}`
fn error_envelope(body: &Value) -> Option<String> {
    let label = body.get("label")?.as_str()?;
    let message = body.get("message").and_then(Value::as_str).unwrap_or_default();
    Some(format!("{}: {}", label, message))
}

/// Gate.io pairs are `BASE_QUOTE`.
fn currency_pair(symbol: &str) -> String {
    match split_pair(symbol) {
        (base, Some(quote)) => format!("{}_{}", base, quote),
        (base, None) => base,
    }
}

#[derive(Debug, Clone)]
pub struct GateioClient {
    transport: HttpTransport,
    base_url: String,
    credentials: Option<Credentials>,
}

impl GateioClient {
    pub fn new(config: &ExchangeConfig, http: &HttpConfig) -> ExchangeResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(NAME, http, error_envelope)?,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            credentials: Credentials::from_config(config),
        })
    }

    async fn public_get(&self, endpoint: &'static str, path: &str, query: &[(&str, &str)]) -> ExchangeResult<Value> {
        let request = self
            .transport
            .client()
            .get(format!("{}{}", self.base_url, path))
            .query(query);
        self.transport.send_json(endpoint, request).await
    }
}

#[async_trait]
impl ExchangeClient for GateioClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn server_time(&self) -> ExchangeResult<u64> {
        let body = self.public_get("server_time", "/spot/time", &[]).await?;
        body.get("server_time")
            .and_then(Value::as_u64)
            .ok_or_else(|| ExchangeError::Decode {
                exchange: NAME,
                message: "missing server_time".to_string(),
            })
    }

    async fn ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let pair = currency_pair(symbol);
        let body = self
            .public_get("ticker", "/spot/tickers", &[("currency_pair", pair.as_str())])
            .await?;
        let entry = body
            .as_array()
            .and_then(|tickers| tickers.first())
            .ok_or_else(|| ExchangeError::Decode {
                exchange: NAME,
                message: "empty tickers array".to_string(),
            })?;
        Ok(Ticker {
            symbol: pair,
            last_price: http::field(NAME, entry, "/last")?,
            bid: http::field(NAME, entry, "/highest_bid")?,
            ask: http::field(NAME, entry, "/lowest_ask")?,
            volume_24h: http::field(NAME, entry, "/base_volume")?,
        })
    }

    async fn order_book(&self, symbol: &str, depth: usize) -> ExchangeResult<OrderBook> {
        let pair = currency_pair(symbol);
        let limit = depth.to_string();
        let body = self
            .public_get(
                "order_book",
                "/spot/order_book",
                &[("currency_pair", pair.as_str()), ("limit", limit.as_str())],
            )
            .await?;
        Ok(OrderBook {
            bids: http::levels(NAME, body.get("bids"), "bids")?,
            asks: http::levels(NAME, body.get("asks"), "asks")?,
        }
        .truncate(depth))
    }

    async fn balances(&self) -> ExchangeResult<Vec<AssetBalance>> {
        let credentials = self.credentials.as_ref().ok_or(ExchangeError::MissingCredentials {
            exchange: NAME,
            operation: "balances",
        })?;

        let url = format!("{}/spot/accounts", self.base_url);
        // The signature covers the request path as sent, including the `/api/v4` prefix.
        let path = url::Url::parse(&url)
            .map(|parsed| parsed.path().to_string())
            .map_err(|e| ExchangeError::Client(format!("invalid base URL: {}", e)))?;
        let timestamp = (http::unix_millis() / 1000).to_string();
        let signature = signing::gateio_signature(&credentials.api_secret, "GET", &path, "", "", &timestamp)?;

        let request = self
            .transport
            .client()
            .get(url)
            .header("KEY", &credentials.api_key)
            .header("Timestamp", timestamp)
            .header("SIGN", signature);
        let body = self.transport.send_json("balances", request).await?;

        let accounts = body.as_array().ok_or_else(|| ExchangeError::Decode {
            exchange: NAME,
            message: "expected an array of accounts".to_string(),
        })?;

        let mut balances = Vec::new();
        for account in accounts {
            let balance = AssetBalance {
                asset: http::field(NAME, account, "/currency")?,
                free: http::field(NAME, account, "/available")?,
                locked: http::field(NAME, account, "/locked")?,
            };
            if !(is_zero_decimal(&balance.free) && is_zero_decimal(&balance.locked)) {
                balances.push(balance);
            }
        }
        Ok(balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_currency_pair() {
        assert_eq!(currency_pair("btc/usdt"), "BTC_USDT");
        assert_eq!(currency_pair("ETH-BTC"), "ETH_BTC");
    }

    #[test]
    fn test_error_envelope() {
        assert_eq!(
            error_envelope(&json!({"label": "INVALID_CURRENCY", "message": "Invalid currency"})),
            Some("INVALID_CURRENCY: Invalid currency".to_string())
        );
        assert_eq!(error_envelope(&json!([{"currency_pair": "BTC_USDT"}])), None);
    }
}

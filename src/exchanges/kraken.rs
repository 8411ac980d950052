//! Kraken spot REST client.
//!
//! Every Kraken response is `{"error": [...], "result": {...}}`; a non-empty
//! `error` array is a failure even with HTTP 200.

use async_trait::async_trait;
use serde_json::Value;
use url::form_urlencoded;

use crate::config::schema::{ExchangeConfig, HttpConfig};
use crate::exchanges::http::{self, HttpTransport};
use crate::exchanges::signing;
use crate::exchanges::types::{
    is_zero_decimal, joined_pair, AssetBalance, Credentials, ExchangeClient, ExchangeError,
    ExchangeResult, OrderBook, Ticker,
};

pub const DEFAULT_BASE_URL: &str = "https://api.kraken.com";
const NAME: &str = "kraken";
const BALANCE_PATH: &str = "/0/private/Balance";

fn error_envelope(body: &Value) -> Option<String> {
    let errors = body.get("error")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    let messages: Vec<&str> = errors.iter().filter_map(Value::as_str).collect();
    Some(messages.join(", "))
}

/// Kraken keys results by its own pair name (`XXBTZUSD` for `XBTUSD`);
/// single-pair queries have exactly one entry.
fn first_result<'a>(body: &'a Value) -> ExchangeResult<&'a Value> {
    body.get("result")
        .and_then(Value::as_object)
        .and_then(|result| result.values().next())
        .ok_or_else(|| ExchangeError::Decode {
            exchange: NAME,
            message: "empty result object".to_string(),
        })
}

/// Kraken spells bitcoin `XBT`.
fn kraken_pair(symbol: &str) -> String {
    let pair = joined_pair(symbol);
    match pair.strip_prefix("BTC") {
        Some(rest) => format!("XBT{}", rest),
        None => pair,
    }
}

#[derive(Debug, Clone)]
pub struct KrakenClient {
    transport: HttpTransport,
    base_url: String,
    credentials: Option<Credentials>,
}

impl KrakenClient {
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
impl ExchangeClient for KrakenClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn server_time(&self) -> ExchangeResult<u64> {
        let body = self.public_get("server_time", "/0/public/Time", &[]).await?;
        body.pointer("/result/unixtime")
            .and_then(Value::as_u64)
            .map(|secs| secs * 1000)
            .ok_or_else(|| ExchangeError::Decode {
                exchange: NAME,
                message: "missing result.unixtime".to_string(),
            })
    }

    async fn ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let pair = kraken_pair(symbol);
        let body = self
            .public_get("ticker", "/0/public/Ticker", &[("pair", pair.as_str())])
            .await?;
        let entry = first_result(&body)?;
        Ok(Ticker {
            symbol: pair,
            last_price: http::field(NAME, entry, "/c/0")?,
            bid: http::field(NAME, entry, "/b/0")?,
            ask: http::field(NAME, entry, "/a/0")?,
            volume_24h: http::field(NAME, entry, "/v/1")?,
        })
    }

    async fn order_book(&self, symbol: &str, depth: usize) -> ExchangeResult<OrderBook> {
        let pair = kraken_pair(symbol);
        let count = depth.to_string();
        let body = self
            .public_get(
                "order_book",
                "/0/public/Depth",
                &[("pair", pair.as_str()), ("count", count.as_str())],
            )
            .await?;
        let entry = first_result(&body)?;
        Ok(OrderBook {
            bids: http::levels(NAME, entry.get("bids"), "bids")?,
            asks: http::levels(NAME, entry.get("asks"), "asks")?,
        }
        .truncate(depth))
    }

    async fn balances(&self) -> ExchangeResult<Vec<AssetBalance>> {
        let credentials = self.credentials.as_ref().ok_or(ExchangeError::MissingCredentials {
            exchange: NAME,
            operation: "balances",
        })?;

        let nonce = http::unix_millis().to_string();
        let post_data = form_urlencoded::Serializer::new(String::new())
            .append_pair("nonce", &nonce)
            .finish();
        let signature = signing::kraken_signature(&credentials.api_secret, BALANCE_PATH, &nonce, &post_data)?;

        let request = self
            .transport
            .client()
            .post(format!("{}{}", self.base_url, BALANCE_PATH))
            .header("API-Key", &credentials.api_key)
            .header("API-Sign", signature)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(post_data);
        let body = self.transport.send_json("balances", request).await?;

        let result = body
            .get("result")
            .and_then(Value::as_object)
            .ok_or_else(|| ExchangeError::Decode {
                exchange: NAME,
                message: "missing result object".to_string(),
            })?;

        // The Balance endpoint reports totals only; held funds are not broken out.
        Ok(result
            .iter()
            .filter_map(|(asset, amount)| {
                let amount = http::decimal_string(amount)?;
                (!is_zero_decimal(&amount)).then(|| AssetBalance {
                    asset: asset.clone(),
                    free: amount,
                    locked: "0".to_string(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_envelope() {
        assert_eq!(
            error_envelope(&json!({"error": ["EQuery:Unknown asset pair"]})),
            Some("EQuery:Unknown asset pair".to_string())
        );
        assert_eq!(error_envelope(&json!({"error": [], "result": {}})), None);
    }

    #[test]
    fn test_kraken_pair() {
        assert_eq!(kraken_pair("btc/usd"), "XBTUSD");
        assert_eq!(kraken_pair("ETH-EUR"), "ETHEUR");
    }

    #[test]
    fn test_first_result() {
        let body = json!({"error": [], "result": {"XXBTZUSD": {"c": ["1", "2"]}}});
        assert_eq!(first_result(&body).unwrap()["c"][0], "1");
        assert!(first_result(&json!({"error": [], "result": {}})).is_err());
    }
}

//! Binance spot REST client.

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

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
const NAME: &str = "binance";
const RECV_WINDOW_MS: u64 = 5000;
/// Depth limits the API accepts.
const DEPTH_LIMITS: [usize; 8] = [5, 10, 20, 50, 100, 500, 1000, 5000];

/// `{"code": -1121, "msg": "Invalid symbol."}`
fn error_envelope(body: &Value) -> Option<String> {
    let code = body.get("code")?;
    let msg = body.get("msg")?.as_str()?;
    Some(format!("{} {}", code, msg))
}

#[derive(Debug, Clone)]
pub struct BinanceClient {
    transport: HttpTransport,
    base_url: String,
    credentials: Option<Credentials>,
}

impl BinanceClient {
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
impl ExchangeClient for BinanceClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn server_time(&self) -> ExchangeResult<u64> {
        let body = self.public_get("server_time", "/api/v3/time", &[]).await?;
        body.get("serverTime")
            .and_then(Value::as_u64)
            .ok_or_else(|| ExchangeError::Decode {
                exchange: NAME,
                message: "missing serverTime".to_string(),
            })
    }

    async fn ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let pair = joined_pair(symbol);
        let body = self
            .public_get("ticker", "/api/v3/ticker/24hr", &[("symbol", pair.as_str())])
            .await?;
        Ok(Ticker {
            symbol: pair,
            last_price: http::field(NAME, &body, "/lastPrice")?,
            bid: http::field(NAME, &body, "/bidPrice")?,
            ask: http::field(NAME, &body, "/askPrice")?,
            volume_24h: http::field(NAME, &body, "/volume")?,
        })
    }

    async fn order_book(&self, symbol: &str, depth: usize) -> ExchangeResult<OrderBook> {
        let pair = joined_pair(symbol);
        let limit = DEPTH_LIMITS
            .iter()
            .copied()
            .find(|limit| *limit >= depth)
            .unwrap_or(5000)
            .to_string();
        let body = self
            .public_get("order_book", "/api/v3/depth", &[("symbol", pair.as_str()), ("limit", limit.as_str())])
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

        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("recvWindow", &RECV_WINDOW_MS.to_string())
            .append_pair("timestamp", &http::unix_millis().to_string())
            .finish();
        let signature = signing::binance_signature(&credentials.api_secret, &query)?;

        let request = self
            .transport
            .client()
            .get(format!(
                "{}/api/v3/account?{}&signature={}",
                self.base_url, query, signature
            ))
            .header("X-MBX-APIKEY", &credentials.api_key);
        let body = self.transport.send_json("balances", request).await?;

        let entries = body
            .get("balances")
            .and_then(Value::as_array)
            .ok_or_else(|| ExchangeError::Decode {
                exchange: NAME,
                message: "missing balances array".to_string(),
            })?;

        let mut balances = Vec::new();
        for entry in entries {
            let balance = AssetBalance {
                asset: http::field(NAME, entry, "/asset")?,
                free: http::field(NAME, entry, "/free")?,
                locked: http::field(NAME, entry, "/locked")?,
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
    fn test_error_envelope() {
        assert_eq!(
            error_envelope(&json!({"code": -1121, "msg": "Invalid symbol."})),
            Some("-1121 Invalid symbol.".to_string())
        );
        assert_eq!(error_envelope(&json!({"serverTime": 1})), None);
    }

    #[tokio::test]
    async fn test_balances_without_credentials_fails_before_io() {
        let config = ExchangeConfig {
            base_url: Some("http://127.0.0.1:1".to_string()),
            ..Default::default()
        };
        let client = BinanceClient::new(&config, &HttpConfig::default()).unwrap();
        let err = client.balances().await.unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::MissingCredentials { exchange: "binance", operation: "balances" }
        ));
    }
}

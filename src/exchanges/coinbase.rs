//! Coinbase Exchange REST client.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::schema::{ExchangeConfig, HttpConfig};
use crate::exchanges::http::{self, HttpTransport};
use crate::exchanges::signing;
use crate::exchanges::types::{
    is_zero_decimal, split_pair, AssetBalance, Credentials, ExchangeClient, ExchangeError,
    ExchangeResult, OrderBook, Ticker,
};

pub const DEFAULT_BASE_URL: &str = "https://api.exchange.coinbase.com";
const NAME: &str = "coinbase";
const ACCOUNTS_PATH: &str = "/accounts";

/// `{"message": "NotFound"}`
fn error_envelope(body: &Value) -> Option<String> {
    body.get("message")?.as_str().map(str::to_string)
}

/// Coinbase product ids are `BASE-QUOTE`.
fn product_id(symbol: &str) -> String {
    match split_pair(symbol) {
        (base, Some(quote)) => format!("{}-{}", base, quote),
        (base, None) => base,
    }
}

#[derive(Debug, Clone)]
pub struct CoinbaseClient {
    transport: HttpTransport,
    base_url: String,
    credentials: Option<Credentials>,
}

impl CoinbaseClient {
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

    async fn public_get(&self, endpoint: &'static str, path: &str) -> ExchangeResult<Value> {
        let request = self.transport.client().get(format!("{}{}", self.base_url, path));
        self.transport.send_json(endpoint, request).await
    }
}

#[async_trait]
impl ExchangeClient for CoinbaseClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn server_time(&self) -> ExchangeResult<u64> {
        let body = self.public_get("server_time", "/time").await?;
        body.get("epoch")
            .and_then(Value::as_f64)
            .map(|epoch| (epoch * 1000.0) as u64)
            .ok_or_else(|| ExchangeError::Decode {
                exchange: NAME,
                message: "missing epoch".to_string(),
            })
    }

    async fn ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let product = product_id(symbol);
        let body = self
            .public_get("ticker", &format!("/products/{}/ticker", product))
            .await?;
        Ok(Ticker {
            symbol: product,
            last_price: http::field(NAME, &body, "/price")?,
            bid: http::field(NAME, &body, "/bid")?,
            ask: http::field(NAME, &body, "/ask")?,
            volume_24h: http::field(NAME, &body, "/volume")?,
        })
    }

    async fn order_book(&self, symbol: &str, depth: usize) -> ExchangeResult<OrderBook> {
        let product = product_id(symbol);
        let body = self
            .public_get("order_book", &format!("/products/{}/book?level=2", product))
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
        let passphrase = credentials.passphrase.as_ref().ok_or(ExchangeError::MissingCredentials {
            exchange: NAME,
            operation: "balances (passphrase)",
        })?;

        let timestamp = (http::unix_millis() / 1000).to_string();
        let signature = signing::coinbase_signature(&credentials.api_secret, &timestamp, "GET", ACCOUNTS_PATH, "")?;

        let request = self
            .transport
            .client()
            .get(format!("{}{}", self.base_url, ACCOUNTS_PATH))
            .header("CB-ACCESS-KEY", &credentials.api_key)
            .header("CB-ACCESS-SIGN", signature)
            .header("CB-ACCESS-TIMESTAMP", timestamp)
            .header("CB-ACCESS-PASSPHRASE", passphrase);
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
                locked: http::field(NAME, account, "/hold")?,
            };
            if !(is_zero_decimal(&balance.free) && is_zero_decimal(&balance.locked)) {
                balances.push(balance);
            }
        }
        Ok(balances)
    }
}

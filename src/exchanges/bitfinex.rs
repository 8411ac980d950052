//! Bitfinex v2 REST client.
//!
//! Public endpoints live on `api-pub.bitfinex.com`, authenticated ones on
//! `api.bitfinex.com`. A configured `base_url` replaces both. Responses are
//! positional arrays rather than objects.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::schema::{ExchangeConfig, HttpConfig};
use crate::exchanges::http::{self, HttpTransport};
use crate::exchanges::signing;
use crate::exchanges::types::{
    is_zero_decimal, joined_pair, AssetBalance, Credentials, ExchangeClient, ExchangeError,
    ExchangeResult, OrderBook, PriceLevel, Ticker,
};

pub const DEFAULT_PUBLIC_URL: &str = "https://api-pub.bitfinex.com";
pub const DEFAULT_AUTH_URL: &str = "https://api.bitfinex.com";
const NAME: &str = "bitfinex";
const WALLETS_PATH: &str = "v2/auth/r/wallets";
/// Book lengths the API accepts.
const BOOK_LENGTHS: [usize; 3] = [1, 25, 100];

/// `["error", 10020, "symbol: invalid"]`
fn error_envelope(body: &Value) -> Option<String> {
    let items = body.as_array()?;
    if items.first()?.as_str()? != "error" {
        return None;
    }
    let code = items.get(1).map(Value::to_string).unwrap_or_default();
    let message = items.get(2).and_then(Value::as_str).unwrap_or("unknown error");
    Some(format!("{} {}", code, message))
}

/// Trading symbols are `t` + pair, e.g. `tBTCUSD`.
fn trading_symbol(symbol: &str) -> String {
    let trimmed = symbol.trim();
    if let Some(rest) = trimmed.strip_prefix('t') {
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == ':') {
            return trimmed.to_string();
        }
    }
    format!("t{}", joined_pair(trimmed))
}

fn decode_error(message: impl Into<String>) -> ExchangeError {
    ExchangeError::Decode {
        exchange: NAME,
        message: message.into(),
    }
}

fn number_at(values: &[Value], index: usize, what: &str) -> ExchangeResult<String> {
    values
        .get(index)
        .and_then(http::decimal_string)
        .ok_or_else(|| decode_error(format!("missing {} at index {}", what, index)))
}

#[derive(Debug, Clone)]
pub struct BitfinexClient {
    transport: HttpTransport,
    public_url: String,
    auth_url: String,
    credentials: Option<Credentials>,
}

impl BitfinexClient {
    pub fn new(config: &ExchangeConfig, http: &HttpConfig) -> ExchangeResult<Self> {
        let (public_url, auth_url) = match &config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/').to_string();
                (base.clone(), base)
            }
            None => (DEFAULT_PUBLIC_URL.to_string(), DEFAULT_AUTH_URL.to_string()),
        };
        Ok(Self {
            transport: HttpTransport::new(NAME, http, error_envelope)?,
            public_url,
            auth_url,
            credentials: Credentials::from_config(config),
        })
    }
}

#[async_trait]
impl ExchangeClient for BitfinexClient {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn ticker(&self, symbol: &str) -> ExchangeResult<Ticker> {
        let symbol = trading_symbol(symbol);
        let request = self
            .transport
            .client()
            .get(format!("{}/v2/ticker/{}", self.public_url, symbol));
        let body = self.transport.send_json("ticker", request).await?;
        let values = body.as_array().ok_or_else(|| decode_error("expected ticker array"))?;

        Ok(Ticker {
            last_price: number_at(values, 6, "LAST_PRICE")?,
            bid: number_at(values, 0, "BID")?,
            ask: number_at(values, 2, "ASK")?,
            volume_24h: number_at(values, 7, "VOLUME")?,
            symbol,
        })
    }

    async fn order_book(&self, symbol: &str, depth: usize) -> ExchangeResult<OrderBook> {
        let symbol = trading_symbol(symbol);
        let len = BOOK_LENGTHS
            .iter()
            .copied()
            .find(|len| *len >= depth)
            .unwrap_or(100);
        let request = self
            .transport
            .client()
            .get(format!("{}/v2/book/{}/P0", self.public_url, symbol))
            .query(&[("len", len)]);
        let body = self.transport.send_json("order_book", request).await?;
        let entries = body.as_array().ok_or_else(|| decode_error("expected book array"))?;

        // [PRICE, COUNT, AMOUNT]; positive amounts are bids, negative are asks.
        let mut book = OrderBook::default();
        for entry in entries {
            let values = entry.as_array().ok_or_else(|| decode_error("malformed book entry"))?;
            let price = number_at(values, 0, "PRICE")?;
            let amount = number_at(values, 2, "AMOUNT")?;
            match amount.strip_prefix('-') {
                Some(abs) => book.asks.push(PriceLevel {
                    price,
                    amount: abs.to_string(),
                }),
                None => book.bids.push(PriceLevel { price, amount }),
            }
        }
        Ok(book.truncate(depth))
    }

    async fn balances(&self) -> ExchangeResult<Vec<AssetBalance>> {
        let credentials = self.credentials.as_ref().ok_or(ExchangeError::MissingCredentials {
            exchange: NAME,
            operation: "balances",
        })?;

        // Microsecond nonce; must strictly increase per key.
        let nonce = (http::unix_millis() * 1000).to_string();
        let body = "{}";
        let signature = signing::bitfinex_signature(&credentials.api_secret, WALLETS_PATH, &nonce, body)?;

        let request = self
            .transport
            .client()
            .post(format!("{}/{}", self.auth_url, WALLETS_PATH))
            .header("bfx-nonce", nonce)
            .header("bfx-apikey", &credentials.api_key)
            .header("bfx-signature", signature)
            .header("Content-Type", "application/json")
            .body(body);
        let response = self.transport.send_json("balances", request).await?;
        let wallets = response.as_array().ok_or_else(|| decode_error("expected wallets array"))?;

        // [WALLET_TYPE, CURRENCY, BALANCE, UNSETTLED_INTEREST, AVAILABLE_BALANCE, ...]
        // Only spot ("exchange") wallets are reported.
        let mut balances = Vec::new();
        for wallet in wallets {
            let values = wallet.as_array().ok_or_else(|| decode_error("malformed wallet entry"))?;
            if values.first().and_then(Value::as_str) != Some("exchange") {
                continue;
            }
            let currency = values
                .get(1)
                .and_then(Value::as_str)
                .ok_or_else(|| decode_error("missing CURRENCY"))?;
            let total = number_at(values, 2, "BALANCE")?;
            let free = values.get(4).and_then(http::decimal_string).unwrap_or_else(|| total.clone());
            if is_zero_decimal(&total) {
                continue;
            }
            balances.push(AssetBalance {
                asset: currency.to_string(),
                free,
                locked: "0".to_string(),
            });
        }
        Ok(balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trading_symbol() {
        assert_eq!(trading_symbol("btc/usd"), "tBTCUSD");
        assert_eq!(trading_symbol("tBTCUSD"), "tBTCUSD");
        assert_eq!(trading_symbol("TESTBTC:TESTUSD"), "tTESTBTC:TESTUSD");
    }

    #[test]
    fn test_error_envelope() {
        assert_eq!(
            error_envelope(&json!(["error", 10020, "symbol: invalid"])),
            Some("10020 symbol: invalid".to_string())
        );
        assert_eq!(error_envelope(&json!([1.0, 2.0])), None);
        assert_eq!(error_envelope(&json!({"a": 1})), None);
    }

    #[tokio::test]
    async fn test_server_time_unsupported() {
        let client = BitfinexClient::new(&ExchangeConfig::default(), &HttpConfig::default()).unwrap();
        assert!(matches!(
            client.server_time().await,
            Err(ExchangeError::Unsupported { exchange: "bitfinex", .. })
        ));
    }
}

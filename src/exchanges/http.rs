//! HTTP plumbing shared by every exchange client.
//!
//! # Responsibilities
//! - Send a request, map status codes and provider error envelopes to `ExchangeError`
//! - Record one `catalog_exchange_requests_total` sample per call

use reqwest::RequestBuilder;
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::schema::HttpConfig;
use crate::http::build_http_client;
use crate::exchanges::types::{ExchangeError, ExchangeResult, PriceLevel};
use crate::observability::metrics;

/// Extracts a provider error message from a parsed body, if it is an error envelope.
pub type EnvelopeFn = fn(&Value) -> Option<String>;

/// Per-exchange request sender.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    exchange: &'static str,
    envelope: EnvelopeFn,
}

impl HttpTransport {
    /// # Arguments
    /// * `exchange` - Exchange name used in errors, logs and metrics
    /// * `config` - Timeouts and User-Agent
    /// * `envelope` - Recognizes the exchange's error body shape
    pub fn new(exchange: &'static str, config: &HttpConfig, envelope: EnvelopeFn) -> ExchangeResult<Self> {
        let client = build_http_client(config).map_err(|e| ExchangeError::Client(e.to_string()))?;
        Ok(Self {
            client,
            exchange,
            envelope,
        })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn exchange(&self) -> &'static str {
        self.exchange
    }

    /// Send `request` and return the parsed JSON body.
    ///
    /// A non-2xx status, or a 2xx body matching the error envelope, is an
    /// `ExchangeError::Api` carrying the provider's message.
    pub async fn send_json(&self, endpoint: &'static str, request: RequestBuilder) -> ExchangeResult<Value> {
        let result = self.execute(request).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(ExchangeError::Api { .. }) => "api_error",
            Err(ExchangeError::Transport { .. }) => "transport_error",
            Err(_) => "decode_error",
        };
        metrics::record_exchange_request(self.exchange, endpoint, outcome);

        match &result {
            Ok(_) => tracing::debug!(exchange = self.exchange, endpoint, "Exchange request succeeded"),
            Err(e) => tracing::warn!(exchange = self.exchange, endpoint, error = %e, "Exchange request failed"),
        }
        result
    }

    async fn execute(&self, request: RequestBuilder) -> ExchangeResult<Value> {
        let exchange = self.exchange;
        let response = request
            .send()
            .await
            .map_err(|source| ExchangeError::Transport { exchange, source })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| ExchangeError::Transport { exchange, source })?;
        let parsed = serde_json::from_str::<Value>(&text);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|body| (self.envelope)(&body))
                .unwrap_or_else(|| truncate_body(&text));
            return Err(ExchangeError::Api {
                exchange,
                status: Some(status.as_u16()),
                message,
            });
        }

        let body = parsed.map_err(|e| ExchangeError::Decode {
            exchange,
            message: format!("invalid JSON: {}", e),
        })?;
        if let Some(message) = (self.envelope)(&body) {
            return Err(ExchangeError::Api {
                exchange,
                status: Some(status.as_u16()),
                message,
            });
        }
        Ok(body)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("exchange", &self.exchange)
            .finish()
    }
}

fn truncate_body(text: &str) -> String {
    const MAX: usize = 200;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None if text.is_empty() => "empty response body".to_string(),
        None => text.to_string(),
    }
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Render a JSON string or number as a decimal string.
pub(crate) fn decimal_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decimal string at a JSON pointer, e.g. `/result/unixtime`.
pub(crate) fn field(exchange: &'static str, value: &Value, pointer: &str) -> ExchangeResult<String> {
    value
        .pointer(pointer)
        .and_then(decimal_string)
        .ok_or_else(|| ExchangeError::Decode {
            exchange,
            message: format!("missing or non-numeric field {}", pointer),
        })
}

/// Parse `[[price, amount, ...], ...]` levels.
pub(crate) fn levels(exchange: &'static str, value: Option<&Value>, side: &str) -> ExchangeResult<Vec<PriceLevel>> {
    let entries = value.and_then(Value::as_array).ok_or_else(|| ExchangeError::Decode {
        exchange,
        message: format!("missing {} array", side),
    })?;

    entries
        .iter()
        .map(|entry| {
            let price = entry.get(0).and_then(decimal_string);
            let amount = entry.get(1).and_then(decimal_string);
            match (price, amount) {
                (Some(price), Some(amount)) => Ok(PriceLevel { price, amount }),
                _ => Err(ExchangeError::Decode {
                    exchange,
                    message: format!("malformed {} level: {}", side, entry),
                }),
            }
        })
        .collect()
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, multipliers ≥ 1)
//! - Check URLs, socket addresses and contract addresses parse
//! - Check pinning credentials match the selected provider
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CatalogConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use alloy::primitives::Address;

use crate::config::schema::{CatalogConfig, PinningProvider};
use crate::exchanges::ExchangeKind;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: String, value: &str) {
    if let Err(e) = url::Url::parse(value) {
        errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e)));
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &CatalogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::new("http.request_timeout_secs", "must be greater than 0"));
    }
    if config.http.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("http.connect_timeout_secs", "must be greater than 0"));
    }

    for (name, exchange) in &config.exchanges {
        if name.parse::<ExchangeKind>().is_err() {
            errors.push(ValidationError::new(
                format!("exchanges.{}", name),
                "unknown exchange (expected binance, kraken, coinbase, bitfinex or gateio)",
            ));
        }
        if let Some(base_url) = &exchange.base_url {
            check_url(&mut errors, format!("exchanges.{}.base_url", name), base_url);
        }
        if exchange.api_key.is_some() != exchange.api_secret.is_some() {
            errors.push(ValidationError::new(
                format!("exchanges.{}", name),
                "api_key and api_secret must be set together",
            ));
        }
    }

    let pinning = &config.pinning;
    if let Some(api_url) = &pinning.api_url {
        check_url(&mut errors, "pinning.api_url".to_string(), api_url);
    }
    if let Some(gateway_url) = &pinning.gateway_url {
        check_url(&mut errors, "pinning.gateway_url".to_string(), gateway_url);
    }
    if pinning.provider == PinningProvider::Infura
        && pinning.project_id.is_some() != pinning.project_secret.is_some()
    {
        errors.push(ValidationError::new(
            "pinning",
            "infura requires project_id and project_secret together",
        ));
    }

    if let Some(contract) = &config.minting.contract_address {
        if contract.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                "minting.contract_address",
                format!("'{}' is not an EVM address", contract),
            ));
        }
    }
    if config.minting.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "minting.confirmation_timeout_secs",
            "must be greater than 0",
        ));
    }

    let chain = &config.blockchain;
    check_url(&mut errors, "blockchain.rpc_url".to_string(), &chain.rpc_url);
    for (i, failover) in chain.failover_urls.iter().enumerate() {
        check_url(&mut errors, format!("blockchain.failover_urls[{}]", i), failover);
    }
    if chain.chain_id == 0 {
        errors.push(ValidationError::new("blockchain.chain_id", "must be greater than 0"));
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be greater than 0"));
    }
    if chain.gas_price_multiplier.is_nan() || chain.gas_price_multiplier < 1.0 {
        errors.push(ValidationError::new(
            "blockchain.gas_price_multiplier",
            "must be at least 1.0",
        ));
    }

    if config.sessions.session_ttl_secs == 0 {
        errors.push(ValidationError::new("sessions.session_ttl_secs", "must be greater than 0"));
    }
    for chain_id in config.sessions.accounts.keys() {
        let valid = chain_id
            .split_once(':')
            .map(|(namespace, reference)| !namespace.is_empty() && !reference.is_empty())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::new(
                format!("sessions.accounts.{}", chain_id),
                "expected a CAIP-2 chain id such as 'eip155:1'",
            ));
        }
    }

    let observability = &config.observability;
    if observability.log_level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", observability.log_level),
        ));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define catalog metrics
//! - Expose a Prometheus-compatible endpoint when enabled
//!
//! # Metrics
//! - `catalog_derivations_total` (counter): key derivations by chain, outcome
//! - `catalog_exchange_requests_total` (counter): exchange calls by exchange, endpoint, outcome
//! - `catalog_pins_total` (counter): pinning uploads by provider, outcome
//! - `catalog_mints_total` (counter): mint attempts by outcome
//! - `catalog_session_events_total` (counter): session events by kind
//! - `catalog_rpc_healthy` (gauge): 1=EVM RPC reachable, 0=unreachable

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Install the Prometheus recorder and HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_derivation(chain: &'static str, outcome: &'static str) {
    metrics::counter!("catalog_derivations_total", "chain" => chain, "outcome" => outcome)
        .increment(1);
}

pub fn record_exchange_request(exchange: &'static str, endpoint: &'static str, outcome: &'static str) {
    metrics::counter!(
        "catalog_exchange_requests_total",
        "exchange" => exchange,
        "endpoint" => endpoint,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_pin(provider: &'static str, outcome: &'static str) {
    metrics::counter!("catalog_pins_total", "provider" => provider, "outcome" => outcome)
        .increment(1);
}

pub fn record_mint(outcome: &'static str) {
    metrics::counter!("catalog_mints_total", "outcome" => outcome).increment(1);
}

pub fn record_session_event(kind: &'static str) {
    metrics::counter!("catalog_session_events_total", "kind" => kind).increment(1);
}

pub fn record_rpc_health(healthy: bool) {
    metrics::gauge!("catalog_rpc_healthy").set(if healthy { 1.0 } else { 0.0 });
}

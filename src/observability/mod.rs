//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events, stderr)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Terminal or log aggregation (pretty or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Logs go to stderr so command output on stdout stays machine-readable
//! - Metric updates are no-ops until a recorder is installed
//! - Secret material never reaches either sink

pub mod logging;
pub mod metrics;

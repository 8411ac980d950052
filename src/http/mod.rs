//! Outbound HTTP client shared by the exchange and pinning subsystems.
//!
//! # Data Flow
//! ```text
//! HttpConfig (timeouts, User-Agent)
//!     → client.rs (reqwest::Client)
//!     → exchanges::http::HttpTransport, minting pinning services
//! ```

pub mod client;

pub use client::build_http_client;

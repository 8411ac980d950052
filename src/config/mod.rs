//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides for secrets)
//!     → validation.rs (semantic checks)
//!     → CatalogConfig (validated, immutable)
//!     → borrowed by the command being run
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The minter's private key is never read from the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_with_env, ConfigError};
pub use schema::{
    BlockchainConfig, CatalogConfig, ExchangeConfig, HttpConfig, MintingConfig,
    ObservabilityConfig, PinningConfig, PinningProvider, SessionConfig,
};

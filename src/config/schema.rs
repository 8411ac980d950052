//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the catalog.
//! Every section defaults, so an empty file (or no file) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// Outbound HTTP settings shared by exchange and pinning clients.
    pub http: HttpConfig,

    /// Per-exchange credentials and endpoint overrides, keyed by exchange name.
    pub exchanges: BTreeMap<String, ExchangeConfig>,

    /// IPFS pinning provider.
    pub pinning: PinningConfig,

    /// NFT minting target.
    pub minting: MintingConfig,

    /// EVM JSON-RPC settings (minting and session signing).
    pub blockchain: BlockchainConfig,

    /// Wallet-connection session settings.
    pub sessions: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Total request timeout in seconds.
    pub request_timeout_secs: u64,

    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// User-Agent header (Coinbase rejects requests without one).
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: concat!("wallet-catalog/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Credentials and endpoint override for one exchange.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ExchangeConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Coinbase only.
    pub passphrase: Option<String>,
    /// Base URL override (testnets, mocks).
    pub base_url: Option<String>,
}

impl fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "[REDACTED]"))
            .field("passphrase", &self.passphrase.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Pinning provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PinningProvider {
    #[default]
    Pinata,
    Infura,
    Lighthouse,
    Filebase,
}

impl PinningProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PinningProvider::Pinata => "pinata",
            PinningProvider::Infura => "infura",
            PinningProvider::Lighthouse => "lighthouse",
            PinningProvider::Filebase => "filebase",
        }
    }
}

/// IPFS pinning configuration.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PinningConfig {
    pub provider: PinningProvider,

    /// Bearer token: Pinata JWT, Lighthouse or Filebase API key.
    pub jwt: Option<String>,

    /// Infura project id (basic auth user).
    pub project_id: Option<String>,

    /// Infura project secret (basic auth password).
    pub project_secret: Option<String>,

    /// API endpoint override.
    pub api_url: Option<String>,

    /// Gateway prefix override, e.g. `https://example.mypinata.cloud/ipfs/`.
    pub gateway_url: Option<String>,
}

impl fmt::Debug for PinningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinningConfig")
            .field("provider", &self.provider)
            .field("jwt", &self.jwt.as_ref().map(|_| "[REDACTED]"))
            .field("project_id", &self.project_id)
            .field(
                "project_secret",
                &self.project_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .finish()
    }
}

/// NFT minting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MintingConfig {
    /// ERC-721 contract exposing `safeMint(address,string)`.
    pub contract_address: Option<String>,

    /// Maximum time to wait for the mint transaction to confirm.
    pub confirmation_timeout_secs: u64,
}

impl Default for MintingConfig {
    fn default() -> Self {
        Self {
            contract_address: None,
            confirmation_timeout_secs: 180,
        }
    }
}

/// EVM JSON-RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations required for finality.
    pub confirmation_blocks: u32,

    /// Gas price multiplier (1.0 = estimated, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            rpc_timeout_secs: 10,
            confirmation_blocks: 3,
            gas_price_multiplier: 1.2,
            max_gas_price_gwei: 500,
        }
    }
}

/// Wallet-connection session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Lifetime of an approved session.
    pub session_ttl_secs: u64,

    /// Accounts offered per CAIP-2 chain id, e.g. `"eip155:1" = ["0x…"]`.
    pub accounts: BTreeMap<String, Vec<String>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 7 * 24 * 60 * 60,
            accounts: BTreeMap::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: CatalogConfig = toml::from_str("").unwrap();
        assert_eq!(config.http.request_timeout_secs, 30);
        assert_eq!(config.pinning.provider, PinningProvider::Pinata);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.exchanges.is_empty());
    }

    #[test]
    fn test_parses_sections() {
        let config: CatalogConfig = toml::from_str(
            r#"
            [exchanges.kraken]
            api_key = "k"
            base_url = "http://127.0.0.1:9000"

            [pinning]
            provider = "lighthouse"
            jwt = "token"

            [sessions.accounts]
            "eip155:1" = ["0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"]

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        let kraken = &config.exchanges["kraken"];
        assert_eq!(kraken.api_key.as_deref(), Some("k"));
        assert!(kraken.api_secret.is_none());
        assert_eq!(config.pinning.provider, PinningProvider::Lighthouse);
        assert_eq!(config.sessions.accounts["eip155:1"].len(), 1);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ExchangeConfig {
            api_key: Some("visible-key".to_string()),
            api_secret: Some("hidden-secret".to_string()),
            passphrase: None,
            base_url: None,
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hidden-secret"));
        assert!(!printed.contains("visible-key"));
    }
}

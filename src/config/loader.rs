//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::CatalogConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::exchanges::ExchangeKind;

/// Prefix for every environment variable the catalog reads.
pub const ENV_PREFIX: &str = "WALLET_CATALOG";

/// Bearer token / JWT for the configured pinning provider.
pub const PINNING_TOKEN_ENV_VAR: &str = "WALLET_CATALOG_PINNING_TOKEN";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse and validate configuration from TOML text, without environment overrides.
pub fn parse_config(content: &str) -> Result<CatalogConfig, ConfigError> {
    let config: CatalogConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<CatalogConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Load from `path` if given, else start from defaults; then apply
/// environment overrides and re-validate.
pub fn load_with_env(path: Option<&Path>) -> Result<CatalogConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => CatalogConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay secrets from the environment onto `config`.
///
/// `lookup` abstracts `std::env::var` so the mapping can be tested without
/// mutating process state. Variables:
/// - `WALLET_CATALOG_<EXCHANGE>_API_KEY`, `_API_SECRET`, `_PASSPHRASE`
/// - `WALLET_CATALOG_PINNING_TOKEN`
pub fn apply_env_overrides<F>(config: &mut CatalogConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for kind in ExchangeKind::ALL {
        let upper = kind.as_str().to_uppercase();
        let api_key = lookup(&format!("{}_{}_API_KEY", ENV_PREFIX, upper));
        let api_secret = lookup(&format!("{}_{}_API_SECRET", ENV_PREFIX, upper));
        let passphrase = lookup(&format!("{}_{}_PASSPHRASE", ENV_PREFIX, upper));

        if api_key.is_none() && api_secret.is_none() && passphrase.is_none() {
            continue;
        }

        let entry = config.exchanges.entry(kind.as_str().to_string()).or_default();
        if api_key.is_some() {
            entry.api_key = api_key;
        }
        if api_secret.is_some() {
            entry.api_secret = api_secret;
        }
        if passphrase.is_some() {
            entry.passphrase = passphrase;
        }
        tracing::debug!(exchange = kind.as_str(), "Exchange credentials read from environment");
    }

    if let Some(token) = lookup(PINNING_TOKEN_ENV_VAR) {
        config.pinning.jwt = Some(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [http]
            request_timeout_secs = 5

            [blockchain]
            rpc_url = "http://127.0.0.1:8545"
            chain_id = 31337
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.http.request_timeout_secs, 5);
        assert_eq!(config.blockchain.chain_id, 31337);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_parse_and_validation_errors() {
        assert!(matches!(parse_config("[http"), Err(ConfigError::Parse(_))));

        let err = parse_config("[http]\nrequest_timeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().starts_with("Validation failed: http.request_timeout_secs"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("WALLET_CATALOG_BINANCE_API_KEY", "env-key"),
            ("WALLET_CATALOG_BINANCE_API_SECRET", "env-secret"),
            ("WALLET_CATALOG_COINBASE_PASSPHRASE", "phrase"),
            ("WALLET_CATALOG_PINNING_TOKEN", "jwt-from-env"),
        ]
        .into_iter()
        .collect();

        let mut config = parse_config(
            r#"
            [exchanges.binance]
            api_key = "file-key"
            api_secret = "file-secret"
            base_url = "http://127.0.0.1:1"
            "#,
        )
        .unwrap();
        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string()));

        let binance = &config.exchanges["binance"];
        assert_eq!(binance.api_key.as_deref(), Some("env-key"));
        assert_eq!(binance.api_secret.as_deref(), Some("env-secret"));
        assert_eq!(binance.base_url.as_deref(), Some("http://127.0.0.1:1"));
        assert_eq!(
            config.exchanges["coinbase"].passphrase.as_deref(),
            Some("phrase")
        );
        assert!(!config.exchanges.contains_key("kraken"));
        assert_eq!(config.pinning.jwt.as_deref(), Some("jwt-from-env"));
    }
}

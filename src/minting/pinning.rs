//! IPFS pinning service abstraction and provider selection.

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde_json::Value;
use std::sync::Arc;

use crate::config::schema::{HttpConfig, PinningConfig, PinningProvider};
use crate::minting::ipfs_api::{IpfsApiPinning, IpfsAuth};
use crate::minting::pinata::PinataPinning;
use crate::minting::types::{MintError, MintResult};
use crate::observability::metrics;

/// Uploads content to IPFS and keeps it pinned.
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Provider name for logs and metrics.
    fn provider(&self) -> &'static str;

    /// Pin raw bytes and return the CID.
    async fn pin_file(&self, name: &str, content: Vec<u8>) -> MintResult<String>;

    /// Pin a JSON document and return the CID.
    async fn pin_json(&self, name: &str, value: &Value) -> MintResult<String>;

    /// HTTP gateway URL for a CID.
    fn gateway_url(&self, cid: &str) -> String;
}

/// Send a pinning request and return the response body, recording the outcome.
pub(crate) async fn send(provider: &'static str, request: RequestBuilder) -> MintResult<String> {
    let result = async {
        let response = request
            .send()
            .await
            .map_err(|source| MintError::Transport { provider, source })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| MintError::Transport { provider, source })?;
        if !status.is_success() {
            return Err(MintError::Pinning {
                provider,
                message: format!("HTTP {}: {}", status.as_u16(), body.trim()),
            });
        }
        Ok(body)
    }
    .await;

    metrics::record_pin(provider, if result.is_ok() { "success" } else { "failure" });
    result
}

/// Join a gateway prefix and a CID.
pub(crate) fn join_gateway(prefix: &str, cid: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), cid)
}

fn bearer_token(config: &PinningConfig) -> MintResult<String> {
    config.jwt.clone().ok_or(MintError::MissingCredentials {
        provider: config.provider.as_str(),
        what: "pinning.jwt or WALLET_CATALOG_PINNING_TOKEN",
    })
}

/// Build the configured pinning service.
///
/// # Arguments
/// * `config` - Provider selection, credentials and URL overrides
/// * `http` - Shared timeouts and User-Agent
pub fn build_pinning_service(config: &PinningConfig, http: &HttpConfig) -> MintResult<Arc<dyn PinningService>> {
    let client = crate::http::build_http_client(http).map_err(|source| MintError::Transport {
        provider: config.provider.as_str(),
        source,
    })?;

    let service: Arc<dyn PinningService> = match config.provider {
        PinningProvider::Pinata => Arc::new(PinataPinning::new(
            client,
            bearer_token(config)?,
            config.api_url.clone(),
            config.gateway_url.clone(),
        )),
        PinningProvider::Infura => {
            let (user, password) = match (&config.project_id, &config.project_secret) {
                (Some(user), Some(password)) => (user.clone(), password.clone()),
                _ => {
                    return Err(MintError::MissingCredentials {
                        provider: "infura",
                        what: "pinning.project_id and pinning.project_secret",
                    })
                }
            };
            Arc::new(IpfsApiPinning::infura(
                client,
                IpfsAuth::Basic { user, password },
                config.api_url.clone(),
                config.gateway_url.clone(),
            ))
        }
        PinningProvider::Lighthouse => Arc::new(IpfsApiPinning::lighthouse(
            client,
            IpfsAuth::Bearer(bearer_token(config)?),
            config.api_url.clone(),
            config.gateway_url.clone(),
        )),
        PinningProvider::Filebase => Arc::new(IpfsApiPinning::filebase(
            client,
            IpfsAuth::Bearer(bearer_token(config)?),
            config.api_url.clone(),
            config.gateway_url.clone(),
        )),
    };

    tracing::debug!(provider = service.provider(), "Pinning service built");
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_gateway() {
        assert_eq!(join_gateway("https://ipfs.io/ipfs/", "bafy"), "https://ipfs.io/ipfs/bafy");
        assert_eq!(join_gateway("https://ipfs.io/ipfs", "bafy"), "https://ipfs.io/ipfs/bafy");
    }

    #[test]
    fn test_build_requires_credentials() {
        let http = HttpConfig::default();
        let mut config = PinningConfig::default();
        assert!(matches!(
            build_pinning_service(&config, &http),
            Err(MintError::MissingCredentials { provider: "pinata", .. })
        ));

        config.jwt = Some("jwt".to_string());
        assert_eq!(build_pinning_service(&config, &http).unwrap().provider(), "pinata");

        config.provider = PinningProvider::Infura;
        assert!(matches!(
            build_pinning_service(&config, &http),
            Err(MintError::MissingCredentials { provider: "infura", .. })
        ));

        config.project_id = Some("id".to_string());
        config.project_secret = Some("secret".to_string());
        let service = build_pinning_service(&config, &http).unwrap();
        assert_eq!(service.provider(), "infura");
        assert_eq!(service.gateway_url("bafy"), "https://ipfs.io/ipfs/bafy");

        config.provider = PinningProvider::Filebase;
        let service = build_pinning_service(&config, &http).unwrap();
        assert_eq!(service.gateway_url("bafy"), "https://ipfs.filebase.io/ipfs/bafy");
    }
}

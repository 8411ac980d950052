//! Pinning through the Kubo-compatible IPFS HTTP API (`/api/v0/add`).
//!
//! Infura authenticates with HTTP basic auth (project id and secret);
//! Lighthouse and Filebase take a bearer token.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use crate::minting::pinning::{self, PinningService};
use crate::minting::types::{MintError, MintResult};

pub const INFURA_API_URL: &str = "https://ipfs.infura.io:5001";
pub const INFURA_GATEWAY_URL: &str = "https://ipfs.io/ipfs/";
pub const LIGHTHOUSE_API_URL: &str = "https://node.lighthouse.storage";
pub const LIGHTHOUSE_GATEWAY_URL: &str = "https://gateway.lighthouse.storage/ipfs/";
pub const FILEBASE_API_URL: &str = "https://rpc.filebase.io";
pub const FILEBASE_GATEWAY_URL: &str = "https://ipfs.filebase.io/ipfs/";

/// Credentials for the IPFS API endpoint.
#[derive(Clone)]
pub enum IpfsAuth {
    Basic { user: String, password: String },
    Bearer(String),
}

impl std::fmt::Debug for IpfsAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpfsAuth::Basic { user, .. } => write!(f, "Basic({}, [REDACTED])", user),
            IpfsAuth::Bearer(_) => write!(f, "Bearer([REDACTED])"),
        }
    }
}

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// `add` streams one JSON object per line; the last one describes the root.
fn parse_add_response(provider: &'static str, body: &str) -> MintResult<String> {
    let line = body
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or(MintError::Pinning {
            provider,
            message: "empty add response".to_string(),
        })?;
    serde_json::from_str::<AddResponse>(line)
        .map(|response| response.hash)
        .map_err(|e| MintError::Pinning {
            provider,
            message: format!("unexpected add response: {}", e),
        })
}

/// IPFS HTTP API pinning client.
#[derive(Debug)]
pub struct IpfsApiPinning {
    provider: &'static str,
    client: reqwest::Client,
    auth: IpfsAuth,
    api_url: String,
    gateway_url: String,
}

impl IpfsApiPinning {
    /// # Arguments
    /// * `provider` - Name used in logs and metrics
    /// * `api_url` - Endpoint root; `/api/v0/add` is appended
    /// * `gateway_url` - Prefix for gateway links
    pub fn new(
        provider: &'static str,
        client: reqwest::Client,
        auth: IpfsAuth,
        api_url: String,
        gateway_url: String,
    ) -> Self {
        Self {
            provider,
            client,
            auth,
            api_url: api_url.trim_end_matches('/').to_string(),
            gateway_url,
        }
    }

    pub fn infura(client: reqwest::Client, auth: IpfsAuth, api_url: Option<String>, gateway_url: Option<String>) -> Self {
        Self::new(
            "infura",
            client,
            auth,
            api_url.unwrap_or_else(|| INFURA_API_URL.to_string()),
            gateway_url.unwrap_or_else(|| INFURA_GATEWAY_URL.to_string()),
        )
    }

    pub fn lighthouse(client: reqwest::Client, auth: IpfsAuth, api_url: Option<String>, gateway_url: Option<String>) -> Self {
        Self::new(
            "lighthouse",
            client,
            auth,
            api_url.unwrap_or_else(|| LIGHTHOUSE_API_URL.to_string()),
            gateway_url.unwrap_or_else(|| LIGHTHOUSE_GATEWAY_URL.to_string()),
        )
    }

    pub fn filebase(client: reqwest::Client, auth: IpfsAuth, api_url: Option<String>, gateway_url: Option<String>) -> Self {
        Self::new(
            "filebase",
            client,
            auth,
            api_url.unwrap_or_else(|| FILEBASE_API_URL.to_string()),
            gateway_url.unwrap_or_else(|| FILEBASE_GATEWAY_URL.to_string()),
        )
    }

    async fn add(&self, name: &str, content: Vec<u8>) -> MintResult<String> {
        let size = content.len();
        let form = Form::new().part("file", Part::bytes(content).file_name(name.to_string()));
        let request = self
            .client
            .post(format!("{}/api/v0/add", self.api_url))
            .query(&[("pin", "true"), ("cid-version", "1")])
            .multipart(form);
        let request = match &self.auth {
            IpfsAuth::Basic { user, password } => request.basic_auth(user, Some(password)),
            IpfsAuth::Bearer(token) => request.bearer_auth(token),
        };

        let cid = parse_add_response(self.provider, &pinning::send(self.provider, request).await?)?;
        tracing::info!(provider = self.provider, cid = %cid, bytes = size, "Content pinned");
        Ok(cid)
    }
}

#[async_trait]
impl PinningService for IpfsApiPinning {
    fn provider(&self) -> &'static str {
        self.provider
    }

    async fn pin_file(&self, name: &str, content: Vec<u8>) -> MintResult<String> {
        self.add(name, content).await
    }

    async fn pin_json(&self, name: &str, value: &Value) -> MintResult<String> {
        let content = serde_json::to_vec(value).map_err(|e| MintError::Metadata(e.to_string()))?;
        self.add(name, content).await
    }

    fn gateway_url(&self, cid: &str) -> String {
        pinning::join_gateway(&self.gateway_url, cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_response() {
        let body = "{\"Name\":\"image.png\",\"Hash\":\"bafyfile\",\"Size\":\"12\"}\n";
        assert_eq!(parse_add_response("infura", body).unwrap(), "bafyfile");

        let streamed = "{\"Name\":\"a\",\"Hash\":\"bafya\",\"Size\":\"1\"}\n{\"Name\":\"\",\"Hash\":\"bafyroot\",\"Size\":\"3\"}\n\n";
        assert_eq!(parse_add_response("infura", streamed).unwrap(), "bafyroot");

        assert!(parse_add_response("infura", "  \n").is_err());
        assert!(parse_add_response("infura", "{\"Name\":\"a\"}").is_err());
    }

    #[test]
    fn test_auth_debug_redacts() {
        let basic = IpfsAuth::Basic {
            user: "project".to_string(),
            password: "hunter2".to_string(),
        };
        assert_eq!(format!("{:?}", basic), "Basic(project, [REDACTED])");
        assert_eq!(format!("{:?}", IpfsAuth::Bearer("t".to_string())), "Bearer([REDACTED])");
    }
}

//! Pinata pinning (`pinFileToIPFS`, `pinJSONToIPFS`).

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::minting::pinning::{self, PinningService};
use crate::minting::types::{MintError, MintResult};

pub const DEFAULT_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud/ipfs/";
const PROVIDER: &str = "pinata";

#[derive(Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

fn parse_cid(body: &str) -> MintResult<String> {
    serde_json::from_str::<PinResponse>(body)
        .map(|response| response.ipfs_hash)
        .map_err(|e| MintError::Pinning {
            provider: PROVIDER,
            message: format!("unexpected response: {}", e),
        })
}

/// Pinata client authenticated with a JWT.
pub struct PinataPinning {
    client: reqwest::Client,
    jwt: String,
    api_url: String,
    gateway_url: String,
}

impl PinataPinning {
    pub fn new(client: reqwest::Client, jwt: String, api_url: Option<String>, gateway_url: Option<String>) -> Self {
        Self {
            client,
            jwt,
            api_url: api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            gateway_url: gateway_url.unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
        }
    }
}

#[async_trait]
impl PinningService for PinataPinning {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn pin_file(&self, name: &str, content: Vec<u8>) -> MintResult<String> {
        let size = content.len();
        let form = Form::new()
            .part("file", Part::bytes(content).file_name(name.to_string()))
            .text("pinataMetadata", json!({ "name": name }).to_string());
        let request = self
            .client
            .post(format!("{}/pinning/pinFileToIPFS", self.api_url))
            .bearer_auth(&self.jwt)
            .multipart(form);

        let cid = parse_cid(&pinning::send(PROVIDER, request).await?)?;
        tracing::info!(provider = PROVIDER, cid = %cid, bytes = size, "File pinned");
        Ok(cid)
    }

    async fn pin_json(&self, name: &str, value: &Value) -> MintResult<String> {
        let body = json!({
            "pinataContent": value,
            "pinataMetadata": { "name": name },
        });
        let request = self
            .client
            .post(format!("{}/pinning/pinJSONToIPFS", self.api_url))
            .bearer_auth(&self.jwt)
            .json(&body);

        let cid = parse_cid(&pinning::send(PROVIDER, request).await?)?;
        tracing::info!(provider = PROVIDER, cid = %cid, "JSON pinned");
        Ok(cid)
    }

    fn gateway_url(&self, cid: &str) -> String {
        pinning::join_gateway(&self.gateway_url, cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cid() {
        let body = r#"{"IpfsHash":"bafkreidvbhs33ighmljlvr7zbv2ywwzcmp5adtf4kqvlly67cy56bdtmve","PinSize":5,"Timestamp":"2024-01-01T00:00:00Z"}"#;
        assert_eq!(
            parse_cid(body).unwrap(),
            "bafkreidvbhs33ighmljlvr7zbv2ywwzcmp5adtf4kqvlly67cy56bdtmve"
        );
        assert!(matches!(parse_cid("{}"), Err(MintError::Pinning { .. })));
    }

    #[test]
    fn test_default_gateway() {
        let pinata = PinataPinning::new(reqwest::Client::new(), "jwt".to_string(), None, None);
        assert_eq!(pinata.gateway_url("bafy"), "https://gateway.pinata.cloud/ipfs/bafy");
    }
}

//! Upload → metadata → upload → mint sequencing.

use async_trait::async_trait;
use std::sync::Arc;

use crate::minting::pinning::PinningService;
use crate::minting::types::{ipfs_uri, MintError, MintReceipt, MintResult, NftMetadata};
use crate::observability::metrics;

/// Calls a chain's mint entry point.
#[async_trait]
pub trait NftMinter: Send + Sync {
    fn chain(&self) -> &'static str;

    /// Reject a recipient this chain cannot mint to. Called before anything is pinned.
    fn validate_recipient(&self, _recipient: &str) -> MintResult<()> {
        Ok(())
    }

    /// Mint one token with `token_uri` to `recipient`; returns the transaction hash.
    async fn mint(&self, recipient: &str, token_uri: &str) -> MintResult<String>;
}

/// Input for one mint.
#[derive(Debug, Clone)]
pub struct MintRequest {
    /// File name for the pinned asset, e.g. `art.png`.
    pub file_name: String,
    pub content: Vec<u8>,
    /// Metadata template; its `image` is replaced with the pinned asset URI.
    pub metadata: NftMetadata,
    pub recipient: String,
}

/// Pins an asset and its metadata, then mints.
pub struct MintPipeline {
    pinning: Arc<dyn PinningService>,
    minter: Arc<dyn NftMinter>,
}

impl MintPipeline {
    pub fn new(pinning: Arc<dyn PinningService>, minter: Arc<dyn NftMinter>) -> Self {
        Self { pinning, minter }
    }

    /// Run the full sequence.
    ///
    /// A failure before anything is pinned is returned as-is. A failure after
    /// pinning is `MintError::Orphaned` listing the pinned CIDs.
    pub async fn run(&self, request: MintRequest) -> MintResult<MintReceipt> {
        let MintRequest {
            file_name,
            content,
            metadata,
            recipient,
        } = request;

        if let Err(e) = self.minter.validate_recipient(&recipient) {
            metrics::record_mint("failure");
            return Err(e);
        }

        let image_cid = match self.pinning.pin_file(&file_name, content).await {
            Ok(cid) => cid,
            Err(e) => {
                metrics::record_mint("failure");
                return Err(e);
            }
        };

        let mut metadata = metadata;
        metadata.image = ipfs_uri(&image_cid);
        if metadata.artifact_uri.is_some() || metadata.display_uri.is_some() {
            metadata = metadata.with_tzip21_uris();
        }
        let metadata_name = metadata_file_name(&metadata.name);

        let metadata_value = match serde_json::to_value(&metadata) {
            Ok(value) => value,
            Err(e) => return Err(self.orphaned(vec![image_cid], e.to_string())),
        };

        let metadata_cid = match self.pinning.pin_json(&metadata_name, &metadata_value).await {
            Ok(cid) => cid,
            Err(e) => return Err(self.orphaned(vec![image_cid], e.to_string())),
        };

        let token_uri = ipfs_uri(&metadata_cid);
        let tx_hash = match self.minter.mint(&recipient, &token_uri).await {
            Ok(hash) => hash,
            Err(e) => return Err(self.orphaned(vec![image_cid, metadata_cid], e.to_string())),
        };

        metrics::record_mint("success");
        tracing::info!(
            chain = self.minter.chain(),
            provider = self.pinning.provider(),
            tx_hash = %tx_hash,
            token_uri = %token_uri,
            "NFT minted"
        );

        Ok(MintReceipt {
            image_url: self.pinning.gateway_url(&image_cid),
            metadata_url: self.pinning.gateway_url(&metadata_cid),
            image_cid,
            metadata_cid,
            token_uri,
            tx_hash,
        })
    }

    fn orphaned(&self, pinned: Vec<String>, reason: String) -> MintError {
        metrics::record_mint("orphaned");
        tracing::warn!(
            provider = self.pinning.provider(),
            pinned = ?pinned,
            reason = %reason,
            "Mint failed after pinning; CIDs remain pinned"
        );
        MintError::Orphaned { pinned, reason }
    }
}

/// Pinned file name for the metadata document, derived from the token name.
fn metadata_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' | '\'' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
    if cleaned.is_empty() {
        return "metadata.json".to_string();
    }
    format!("{}.json", cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakePinning {
        fail_json: bool,
        pinned: Mutex<Vec<(String, Vec<u8>)>>,
    }

    #[async_trait]
    impl PinningService for FakePinning {
        fn provider(&self) -> &'static str {
            "fake"
        }

        async fn pin_file(&self, name: &str, content: Vec<u8>) -> MintResult<String> {
            let mut pinned = self.pinned.lock().unwrap();
            pinned.push((name.to_string(), content));
            Ok(format!("bafy{}", pinned.len()))
        }

        async fn pin_json(&self, name: &str, value: &Value) -> MintResult<String> {
            if self.fail_json {
                return Err(MintError::Pinning {
                    provider: "fake",
                    message: "quota exceeded".to_string(),
                });
            }
            self.pin_file(name, serde_json::to_vec(value).unwrap()).await
        }

        fn gateway_url(&self, cid: &str) -> String {
            format!("https://gw.test/ipfs/{}", cid)
        }
    }

    struct FakeMinter {
        fail: bool,
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl NftMinter for FakeMinter {
        fn chain(&self) -> &'static str {
            "test"
        }

        async fn mint(&self, recipient: &str, token_uri: &str) -> MintResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((recipient.to_string(), token_uri.to_string()));
            if self.fail {
                return Err(MintError::InvalidRecipient(recipient.to_string()));
            }
            Ok("0xfeed".to_string())
        }
    }

    fn request() -> MintRequest {
        MintRequest {
            file_name: "art.png".to_string(),
            content: vec![1, 2, 3],
            metadata: NftMetadata::new("Art", "A piece", ""),
            recipient: "0xrecipient".to_string(),
        }
    }

    /// Accepts only `0x`-prefixed recipients.
    struct StrictMinter;

    #[async_trait]
    impl NftMinter for StrictMinter {
        fn chain(&self) -> &'static str {
            "strict"
        }

        fn validate_recipient(&self, recipient: &str) -> MintResult<()> {
            if recipient.starts_with("0x") {
                Ok(())
            } else {
                Err(MintError::InvalidRecipient(recipient.to_string()))
            }
        }

        async fn mint(&self, _recipient: &str, _token_uri: &str) -> MintResult<String> {
            Ok("0xfeed".to_string())
        }
    }

    fn minter(fail: bool) -> Arc<FakeMinter> {
        Arc::new(FakeMinter {
            fail,
            calls: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_pipeline_sequencing() {
        let pinning = Arc::new(FakePinning::default());
        let minter = minter(false);
        let pipeline = MintPipeline::new(pinning.clone(), minter.clone());

        let receipt = pipeline.run(request()).await.unwrap();
        assert_eq!(receipt.image_cid, "bafy1");
        assert_eq!(receipt.metadata_cid, "bafy2");
        assert_eq!(receipt.token_uri, "ipfs://bafy2");
        assert_eq!(receipt.image_url, "https://gw.test/ipfs/bafy1");
        assert_eq!(receipt.tx_hash, "0xfeed");

        let pinned = pinning.pinned.lock().unwrap();
        assert_eq!(pinned[0].0, "art.png");
        assert_eq!(pinned[1].0, "Art.json");
        let metadata: Value = serde_json::from_slice(&pinned[1].1).unwrap();
        assert_eq!(metadata["image"], "ipfs://bafy1");

        let calls = minter.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("0xrecipient".to_string(), "ipfs://bafy2".to_string())]);
    }

    #[tokio::test]
    async fn test_metadata_pin_failure_reports_image_cid() {
        let pinning = Arc::new(FakePinning {
            fail_json: true,
            ..Default::default()
        });
        let minter = minter(false);
        let pipeline = MintPipeline::new(pinning, minter.clone());

        match pipeline.run(request()).await {
            Err(MintError::Orphaned { pinned, reason }) => {
                assert_eq!(pinned, vec!["bafy1".to_string()]);
                assert!(reason.contains("quota exceeded"));
            }
            other => panic!("expected orphaned error, got {:?}", other),
        }
        assert!(minter.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mint_failure_reports_both_cids() {
        let pipeline = MintPipeline::new(Arc::new(FakePinning::default()), minter(true));
        match pipeline.run(request()).await {
            Err(MintError::Orphaned { pinned, .. }) => {
                assert_eq!(pinned, vec!["bafy1".to_string(), "bafy2".to_string()]);
            }
            other => panic!("expected orphaned error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected_before_pinning() {
        let pinning = Arc::new(FakePinning::default());
        let pipeline = MintPipeline::new(pinning.clone(), Arc::new(StrictMinter));

        let mut bad = request();
        bad.recipient = "not-an-address".to_string();
        match pipeline.run(bad).await {
            Err(MintError::InvalidRecipient(recipient)) => assert_eq!(recipient, "not-an-address"),
            other => panic!("expected invalid recipient, got {:?}", other),
        }
        assert!(pinning.pinned.lock().unwrap().is_empty());

        assert!(pipeline.run(request()).await.is_ok());
        assert_eq!(pinning.pinned.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_metadata_file_name() {
        assert_eq!(metadata_file_name("Art #1"), "Art #1.json");
        assert_eq!(metadata_file_name("a/b\\c\"d"), "a_b_c_d.json");
        assert_eq!(metadata_file_name("  "), "metadata.json");
        assert_eq!(metadata_file_name("../"), "metadata.json");
        assert_eq!(metadata_file_name("line\nbreak"), "line_break.json");
    }
}

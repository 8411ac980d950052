//! NFT metadata, receipts and minting errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blockchain::BlockchainError;

#[derive(Debug, Error)]
pub enum MintError {
    #[error("{provider} is missing credentials: {what}")]
    MissingCredentials {
        provider: &'static str,
        what: &'static str,
    },

    #[error("{provider}: request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx status or an unexpected body from the pinning service.
    #[error("{provider} pinning failed: {message}")]
    Pinning {
        provider: &'static str,
        message: String,
    },

    #[error("No minting contract configured (minting.contract_address)")]
    NoContract,

    #[error("Invalid recipient address '{0}'")]
    InvalidRecipient(String),

    #[error("Metadata serialization failed: {0}")]
    Metadata(String),

    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    /// A later step failed after content was pinned. IPFS pins cannot be
    /// rolled back from here, so the CIDs are reported for manual cleanup.
    #[error("Mint failed after pinning {}: {reason}", .pinned.join(", "))]
    Orphaned { pinned: Vec<String>, reason: String },
}

pub type MintResult<T> = Result<T, MintError>;

/// One `attributes` entry of ERC-721 metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataAttribute {
    pub trait_type: String,
    pub value: serde_json::Value,
}

/// ERC-721 metadata JSON, with the TZIP-21 URI fields Tezos marketplaces read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    /// `ipfs://<cid>` of the pinned asset.
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<MetadataAttribute>,
    #[serde(rename = "artifactUri", skip_serializing_if = "Option::is_none")]
    pub artifact_uri: Option<String>,
    #[serde(rename = "displayUri", skip_serializing_if = "Option::is_none")]
    pub display_uri: Option<String>,
}

impl NftMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: image.into(),
            external_url: None,
            attributes: Vec::new(),
            artifact_uri: None,
            display_uri: None,
        }
    }

    pub fn with_external_url(mut self, url: impl Into<String>) -> Self {
        self.external_url = Some(url.into());
        self
    }

    pub fn with_attribute(mut self, trait_type: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.push(MetadataAttribute {
            trait_type: trait_type.into(),
            value,
        });
        self
    }

    /// Mirror `image` into the TZIP-21 `artifactUri` and `displayUri` fields.
    pub fn with_tzip21_uris(mut self) -> Self {
        self.artifact_uri = Some(self.image.clone());
        self.display_uri = Some(self.image.clone());
        self
    }
}

/// Everything a caller needs after a successful mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintReceipt {
    pub image_cid: String,
    /// Gateway URL of the asset.
    pub image_url: String,
    pub metadata_cid: String,
    pub metadata_url: String,
    /// `ipfs://<metadata cid>` as passed to the contract.
    pub token_uri: String,
    pub tx_hash: String,
}

/// `ipfs://<cid>`
pub fn ipfs_uri(cid: &str) -> String {
    format!("ipfs://{}", cid)
}

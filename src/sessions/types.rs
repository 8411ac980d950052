//! Session, event and JSON-RPC types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// JSON-RPC 2.0 "method not found".
pub const METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC 2.0 "invalid params". Also used for chains outside the session.
pub const INVALID_PARAMS: i64 = -32602;
/// Server-defined range: session missing, expired or handler failure.
pub const SESSION_ERROR: i64 = -32000;

/// Errors raised while handling session events.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    UnknownTopic(String),

    #[error("Session expired: {0}")]
    Expired(String),

    #[error("Chain {chain} is not approved for this session")]
    UnapprovedChain { chain: String },

    #[error("Method not supported: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

impl SessionError {
    /// JSON-RPC error code reported for this error.
    pub fn code(&self) -> i64 {
        match self {
            SessionError::UnsupportedMethod(_) => METHOD_NOT_FOUND,
            SessionError::UnapprovedChain { .. } | SessionError::InvalidParams(_) => INVALID_PARAMS,
            SessionError::UnknownTopic(_) | SessionError::Expired(_) | SessionError::Signing(_) => {
                SESSION_ERROR
            }
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// What a dApp asks for in one namespace (e.g. `eip155`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredNamespace {
    /// CAIP-2 chain ids, e.g. `eip155:1`.
    pub chains: Vec<String>,
    pub methods: Vec<String>,
    #[serde(default)]
    pub events: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProposal {
    pub id: u64,
    /// Name or URL of the requesting dApp.
    pub proposer: String,
    pub required_namespaces: BTreeMap<String, RequiredNamespace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub id: u64,
    pub topic: String,
    /// CAIP-2 chain id the request targets.
    pub chain_id: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Inbound event from the relay transport.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Proposal(SessionProposal),
    Request(SessionRequest),
    Delete { topic: String },
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Proposal(_) => "proposal",
            SessionEvent::Request(_) => "request",
            SessionEvent::Delete { .. } => "delete",
        }
    }
}

/// Approved namespace inside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionNamespace {
    /// CAIP-10 account ids, e.g. `eip155:1:0xab…`.
    pub accounts: Vec<String>,
    pub methods: Vec<String>,
    pub events: Vec<String>,
}

/// An approved wallet-connection session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub topic: String,
    pub proposer: String,
    pub namespaces: BTreeMap<String, SessionNamespace>,
    /// Unix seconds after which the session is no longer usable.
    pub expires_at: u64,
}

impl Session {
    pub fn is_expired(&self, now_secs: u64) -> bool {
        now_secs >= self.expires_at
    }

    fn namespace_for(&self, chain_id: &str) -> Option<&SessionNamespace> {
        let (namespace, _) = chain_id.split_once(':')?;
        self.namespaces.get(namespace)
    }

    /// Addresses approved on `chain_id`, without the CAIP-10 chain prefix.
    pub fn accounts_for(&self, chain_id: &str) -> Vec<&str> {
        let Some(namespace) = self.namespace_for(chain_id) else {
            return Vec::new();
        };
        namespace
            .accounts
            .iter()
            .filter_map(|account| {
                account
                    .strip_prefix(chain_id)
                    .and_then(|rest| rest.strip_prefix(':'))
            })
            .collect()
    }

    pub fn approves_chain(&self, chain_id: &str) -> bool {
        !self.accounts_for(chain_id).is_empty()
    }

    pub fn approves_method(&self, chain_id: &str, method: &str) -> bool {
        self.namespace_for(chain_id)
            .is_some_and(|ns| ns.methods.iter().any(|m| m == method))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// JSON-RPC 2.0 response returned to the dApp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: u64, error: &SessionError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code: error.code(),
                message: error.to_string(),
            }),
        }
    }
}

/// Result of handling one [`SessionEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Approved(Session),
    Rejected { proposal_id: u64, reason: String },
    Response(JsonRpcResponse),
    Deleted { topic: String, existed: bool },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> Session {
        let mut namespaces = BTreeMap::new();
        namespaces.insert(
            "eip155".to_string(),
            SessionNamespace {
                accounts: vec![
                    "eip155:1:0xabc".to_string(),
                    "eip155:137:0xdef".to_string(),
                ],
                methods: vec!["personal_sign".to_string()],
                events: vec![],
            },
        );
        Session {
            topic: "t".to_string(),
            proposer: "dapp".to_string(),
            namespaces,
            expires_at: 100,
        }
    }

    #[test]
    fn test_accounts_for_chain() {
        let session = session();
        assert_eq!(session.accounts_for("eip155:1"), vec!["0xabc"]);
        assert_eq!(session.accounts_for("eip155:137"), vec!["0xdef"]);
        // "eip155:13" must not match the prefix of "eip155:137"
        assert!(session.accounts_for("eip155:13").is_empty());
        assert!(!session.approves_chain("xrpl:0"));
        assert!(session.approves_method("eip155:1", "personal_sign"));
        assert!(!session.approves_method("eip155:1", "eth_sendTransaction"));
    }

    #[test]
    fn test_expiry_boundary() {
        let session = session();
        assert!(!session.is_expired(99));
        assert!(session.is_expired(100));
    }

    #[test]
    fn test_error_codes_and_response_shape() {
        assert_eq!(SessionError::UnsupportedMethod("x".into()).code(), -32601);
        assert_eq!(
            SessionError::UnapprovedChain { chain: "eip155:5".into() }.code(),
            -32602
        );
        assert_eq!(SessionError::Expired("t".into()).code(), -32000);

        let ok = serde_json::to_value(JsonRpcResponse::success(7, json!(["0xabc"]))).unwrap();
        assert_eq!(ok, json!({"jsonrpc": "2.0", "id": 7, "result": ["0xabc"]}));

        let err = serde_json::to_value(JsonRpcResponse::failure(
            8,
            &SessionError::UnknownTopic("t".into()),
        ))
        .unwrap();
        assert_eq!(err["error"]["code"], -32000);
        assert!(err.get("result").is_none());
    }
}

//! Session lifecycle and request dispatch.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::config::SessionConfig;
use crate::observability::metrics;
use crate::sessions::handlers::MethodHandler;
use crate::sessions::store::SessionStore;
use crate::sessions::types::{
    JsonRpcResponse, Session, SessionError, SessionEvent, SessionNamespace, SessionOutcome,
    SessionProposal, SessionRequest, SessionResult,
};

type HandlerMap = BTreeMap<String, Arc<dyn MethodHandler>>;

fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Approves proposals, dispatches requests and deletes sessions.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    /// Namespace → method → handler.
    handlers: BTreeMap<String, HandlerMap>,
    /// CAIP-2 chain id → addresses offered on it.
    accounts: BTreeMap<String, Vec<String>>,
    ttl: Duration,
}

impl SessionManager {
    /// # Arguments
    /// * `store` - Session storage
    /// * `accounts` - Addresses offered per CAIP-2 chain id
    /// * `ttl` - Lifetime of approved sessions
    pub fn new(
        store: Arc<dyn SessionStore>,
        accounts: BTreeMap<String, Vec<String>>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            handlers: BTreeMap::new(),
            accounts,
            ttl,
        }
    }

    pub fn from_config(store: Arc<dyn SessionStore>, config: &SessionConfig) -> Self {
        Self::new(
            store,
            config.accounts.clone(),
            Duration::from_secs(config.session_ttl_secs),
        )
    }

    /// Register `handler` for `namespace` (e.g. `eip155`). Replaces any
    /// handler already registered for the same method.
    pub fn register(&mut self, namespace: &str, handler: Arc<dyn MethodHandler>) {
        self.handlers
            .entry(namespace.to_string())
            .or_default()
            .insert(handler.method().to_string(), handler);
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Handle one relay event.
    pub async fn handle(&self, event: SessionEvent) -> SessionOutcome {
        metrics::record_session_event(event.kind());
        match event {
            SessionEvent::Proposal(proposal) => {
                let proposal_id = proposal.id;
                match self.approve(&proposal) {
                    Ok(session) => {
                        tracing::info!(
                            topic = %session.topic,
                            proposer = %session.proposer,
                            namespaces = session.namespaces.len(),
                            "Session approved"
                        );
                        self.store.set(session.clone()).await;
                        SessionOutcome::Approved(session)
                    }
                    Err(reason) => {
                        tracing::warn!(proposal_id, proposer = %proposal.proposer, %reason, "Session proposal rejected");
                        SessionOutcome::Rejected { proposal_id, reason }
                    }
                }
            }
            SessionEvent::Request(request) => {
                let id = request.id;
                let response = match self.dispatch(&request).await {
                    Ok(result) => JsonRpcResponse::success(id, result),
                    Err(error) => {
                        tracing::debug!(
                            topic = %request.topic,
                            method = %request.method,
                            %error,
                            "Session request failed"
                        );
                        JsonRpcResponse::failure(id, &error)
                    }
                };
                SessionOutcome::Response(response)
            }
            SessionEvent::Delete { topic } => {
                let existed = self.store.remove(&topic).await.is_some();
                tracing::info!(%topic, existed, "Session deleted");
                SessionOutcome::Deleted { topic, existed }
            }
        }
    }

    /// Build a session for `proposal`, or the reason it cannot be approved.
    fn approve(&self, proposal: &SessionProposal) -> Result<Session, String> {
        if proposal.required_namespaces.is_empty() {
            return Err("Proposal requires no namespaces".to_string());
        }

        let mut namespaces = BTreeMap::new();
        for (namespace, required) in &proposal.required_namespaces {
            let handlers = self
                .handlers
                .get(namespace)
                .ok_or_else(|| format!("Unsupported namespace: {}", namespace))?;

            if let Some(method) = required.methods.iter().find(|m| !handlers.contains_key(*m)) {
                return Err(format!("Unsupported method: {}", method));
            }
            if required.chains.is_empty() {
                return Err(format!("Namespace {} lists no chains", namespace));
            }

            let mut accounts = Vec::new();
            for chain in &required.chains {
                let in_namespace = chain
                    .split_once(':')
                    .is_some_and(|(ns, _)| ns == namespace);
                if !in_namespace {
                    return Err(format!("Chain {} is outside namespace {}", chain, namespace));
                }
                let offered = self
                    .accounts
                    .get(chain)
                    .filter(|addresses| !addresses.is_empty())
                    .ok_or_else(|| format!("No accounts configured for {}", chain))?;
                accounts.extend(offered.iter().map(|address| format!("{}:{}", chain, address)));
            }

            namespaces.insert(
                namespace.clone(),
                SessionNamespace {
                    accounts,
                    methods: handlers.keys().cloned().collect(),
                    events: required.events.clone(),
                },
            );
        }

        Ok(Session {
            topic: Uuid::new_v4().simple().to_string(),
            proposer: proposal.proposer.clone(),
            namespaces,
            expires_at: unix_secs().saturating_add(self.ttl.as_secs()),
        })
    }

    async fn dispatch(&self, request: &SessionRequest) -> SessionResult<serde_json::Value> {
        let session = self
            .store
            .get(&request.topic)
            .await
            .ok_or_else(|| SessionError::UnknownTopic(request.topic.clone()))?;

        if session.is_expired(unix_secs()) {
            self.store.remove(&request.topic).await;
            return Err(SessionError::Expired(request.topic.clone()));
        }
        if !session.approves_chain(&request.chain_id) {
            return Err(SessionError::UnapprovedChain {
                chain: request.chain_id.clone(),
            });
        }
        if !session.approves_method(&request.chain_id, &request.method) {
            return Err(SessionError::UnsupportedMethod(request.method.clone()));
        }

        let handler = request
            .chain_id
            .split_once(':')
            .and_then(|(namespace, _)| self.handlers.get(namespace))
            .and_then(|handlers| handlers.get(&request.method))
            .ok_or_else(|| SessionError::UnsupportedMethod(request.method.clone()))?;

        handler.handle(&session, request).await
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn prune_expired(&self) -> usize {
        let now = unix_secs();
        let mut removed = 0;
        for topic in self.store.topics().await {
            let expired = self
                .store
                .get(&topic)
                .await
                .is_some_and(|session| session.is_expired(now));
            if expired && self.store.remove(&topic).await.is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "Pruned expired sessions");
        }
        removed
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("namespaces", &self.handlers.keys().collect::<Vec<_>>())
            .field("chains", &self.accounts.keys().collect::<Vec<_>>())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::handlers::AccountsHandler;
    use crate::sessions::store::InMemorySessionStore;
    use crate::sessions::types::{RequiredNamespace, INVALID_PARAMS, METHOD_NOT_FOUND, SESSION_ERROR};
    use serde_json::{json, Value};

    const ADDRESS: &str = "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf";

    fn manager(ttl: Duration) -> SessionManager {
        let mut accounts = BTreeMap::new();
        accounts.insert("eip155:1".to_string(), vec![ADDRESS.to_string()]);
        let mut manager = SessionManager::new(Arc::new(InMemorySessionStore::new()), accounts, ttl);
        manager.register("eip155", Arc::new(AccountsHandler::new("eip155")));
        manager
    }

    fn proposal(namespace: &str, chain: &str, methods: &[&str]) -> SessionEvent {
        let mut required_namespaces = BTreeMap::new();
        required_namespaces.insert(
            namespace.to_string(),
            RequiredNamespace {
                chains: vec![chain.to_string()],
                methods: methods.iter().map(|m| m.to_string()).collect(),
                events: vec!["accountsChanged".to_string()],
            },
        );
        SessionEvent::Proposal(SessionProposal {
            id: 1,
            proposer: "test dapp".to_string(),
            required_namespaces,
        })
    }

    fn request(topic: &str, chain: &str, method: &str) -> SessionEvent {
        SessionEvent::Request(SessionRequest {
            id: 42,
            topic: topic.to_string(),
            chain_id: chain.to_string(),
            method: method.to_string(),
            params: Value::Null,
        })
    }

    async fn approve(manager: &SessionManager) -> Session {
        match manager
            .handle(proposal("eip155", "eip155:1", &["eip155_getAccounts"]))
            .await
        {
            SessionOutcome::Approved(session) => session,
            other => panic!("expected approval, got {:?}", other),
        }
    }

    fn error_code(outcome: SessionOutcome) -> i64 {
        match outcome {
            SessionOutcome::Response(response) => response.error.expect("error response").code,
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_approve_and_dispatch() {
        let manager = manager(Duration::from_secs(3600));
        let session = approve(&manager).await;

        assert_eq!(session.topic.len(), 32);
        assert_eq!(
            session.namespaces["eip155"].accounts,
            vec![format!("eip155:1:{}", ADDRESS)]
        );
        assert_eq!(manager.store().topics().await, vec![session.topic.clone()]);

        match manager
            .handle(request(&session.topic, "eip155:1", "eip155_getAccounts"))
            .await
        {
            SessionOutcome::Response(response) => {
                assert_eq!(response.id, 42);
                assert_eq!(response.result, Some(json!([ADDRESS])));
                assert!(response.error.is_none());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejects_unsupported_proposals() {
        let manager = manager(Duration::from_secs(3600));

        let outcome = manager.handle(proposal("xrpl", "xrpl:0", &[])).await;
        assert!(matches!(
            outcome,
            SessionOutcome::Rejected { ref reason, .. } if reason.contains("Unsupported namespace")
        ));

        let outcome = manager
            .handle(proposal("eip155", "eip155:1", &["eth_sendTransaction"]))
            .await;
        assert!(matches!(
            outcome,
            SessionOutcome::Rejected { ref reason, .. } if reason.contains("eth_sendTransaction")
        ));

        let outcome = manager.handle(proposal("eip155", "eip155:137", &[])).await;
        assert!(matches!(
            outcome,
            SessionOutcome::Rejected { ref reason, .. } if reason.contains("No accounts")
        ));
        assert!(manager.store().topics().await.is_empty());
    }

    #[tokio::test]
    async fn test_request_errors() {
        let manager = manager(Duration::from_secs(3600));
        let session = approve(&manager).await;

        let code = error_code(manager.handle(request("missing", "eip155:1", "eip155_getAccounts")).await);
        assert_eq!(code, SESSION_ERROR);

        let code = error_code(manager.handle(request(&session.topic, "eip155:1", "eth_sign")).await);
        assert_eq!(code, METHOD_NOT_FOUND);

        let code = error_code(
            manager
                .handle(request(&session.topic, "eip155:5", "eip155_getAccounts"))
                .await,
        );
        assert_eq!(code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_delete_session() {
        let manager = manager(Duration::from_secs(3600));
        let session = approve(&manager).await;

        let outcome = manager
            .handle(SessionEvent::Delete {
                topic: session.topic.clone(),
            })
            .await;
        assert_eq!(
            outcome,
            SessionOutcome::Deleted {
                topic: session.topic.clone(),
                existed: true
            }
        );

        let code = error_code(
            manager
                .handle(request(&session.topic, "eip155:1", "eip155_getAccounts"))
                .await,
        );
        assert_eq!(code, SESSION_ERROR);
    }

    #[tokio::test]
    async fn test_expired_session_is_removed() {
        let manager = manager(Duration::ZERO);
        let session = approve(&manager).await;

        match manager
            .handle(request(&session.topic, "eip155:1", "eip155_getAccounts"))
            .await
        {
            SessionOutcome::Response(response) => {
                let error = response.error.unwrap();
                assert_eq!(error.code, SESSION_ERROR);
                assert!(error.message.contains("expired"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(manager.store().get(&session.topic).await.is_none());
    }

    #[tokio::test]
    async fn test_prune_expired() {
        let manager = manager(Duration::ZERO);
        approve(&manager).await;
        approve(&manager).await;
        assert_eq!(manager.prune_expired().await, 2);
        assert!(manager.store().topics().await.is_empty());
    }
}

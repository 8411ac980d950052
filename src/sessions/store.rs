//! Session storage keyed by topic.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::sessions::types::Session;

/// Storage for approved sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, topic: &str) -> Option<Session>;

    /// Insert or replace the session under its topic.
    async fn set(&self, session: Session);

    /// Remove a session, returning it if present.
    async fn remove(&self, topic: &str) -> Option<Session>;

    async fn topics(&self) -> Vec<String>;
}

/// Process-local store. Safe for concurrent use from many tasks.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, topic: &str) -> Option<Session> {
        self.sessions.get(topic).map(|entry| entry.value().clone())
    }

    async fn set(&self, session: Session) {
        self.sessions.insert(session.topic.clone(), session);
    }

    async fn remove(&self, topic: &str) -> Option<Session> {
        self.sessions.remove(topic).map(|(_, session)| session)
    }

    async fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.sessions.iter().map(|entry| entry.key().clone()).collect();
        topics.sort();
        topics
    }
}

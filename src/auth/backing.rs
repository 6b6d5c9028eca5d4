//! Durable session records for the persisted strategy.
//!
//! The backing is an external collaborator keyed by session token. When
//! persistence is enabled the durable store is authoritative; the in-memory
//! store is a coherent cache warmed from `load_all` at startup.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::store::Session;

#[async_trait]
pub trait SessionBacking: Send + Sync {
    /// Write the durable record for a freshly created session.
    async fn put(&self, session: &Session) -> Result<()>;

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Remove the durable record, returning whether one existed.
    async fn delete(&self, session_id: &str) -> Result<bool>;

    /// All persisted sessions, used to warm the in-memory store at startup.
    async fn load_all(&self) -> Result<Vec<Session>>;
}

/// Backing held in process memory, used when no database is configured and
/// by tests.
#[derive(Debug, Default)]
pub struct MemorySessionBacking {
    records: RwLock<HashMap<String, Session>>,
}

impl MemorySessionBacking {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionBacking for MemorySessionBacking {
    async fn put(&self, session: &Session) -> Result<()> {
        self.records
            .write()
            .await
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn find_by_session_id(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(self.records.read().await.get(session_id).cloned())
    }

    async fn delete(&self, session_id: &str) -> Result<bool> {
        Ok(self.records.write().await.remove(session_id).is_some())
    }

    async fn load_all(&self) -> Result<Vec<Session>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

//! Session token strategies: plain, expiring, and durably persisted.
//!
//! Each variant decorates the previous one's resolution rather than
//! inheriting state: `ExpiringSessionAuth` adds a read-time expiry judgment
//! over `SessionAuth`, and `PersistedSessionAuth` consults durable records
//! instead of the in-memory timestamps.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::backing::SessionBacking;
use super::directory::UserDirectory;
use super::request::RequestParts;
use super::store::{now_unix, SessionStore};
use super::strategy::{AuthAttempt, AuthStrategy, Principal, RejectReason};

/// Cookie-based sessions resolved against the in-memory store.
pub struct SessionAuth {
    cookie_name: String,
    store: Arc<SessionStore>,
    directory: Arc<dyn UserDirectory>,
}

impl SessionAuth {
    #[must_use]
    pub fn new(
        cookie_name: impl Into<String>,
        store: Arc<SessionStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            store,
            directory,
        }
    }

    /// The session token carried by the request, if any.
    fn token(&self, request: &RequestParts) -> Option<String> {
        request.cookie(&self.cookie_name)
    }

    fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Resolve a user id to a principal; directory failures are downgraded.
    async fn principal_for(&self, user_id: Uuid) -> AuthAttempt {
        match self.directory.find_by_id(user_id).await {
            Ok(Some(user)) => AuthAttempt::Granted(Principal::from(&user)),
            Ok(None) => AuthAttempt::Rejected(RejectReason::UnknownUser),
            Err(err) => {
                error!("User lookup failed: {err:#}");
                AuthAttempt::Rejected(RejectReason::Collaborator)
            }
        }
    }
}

#[async_trait]
impl AuthStrategy for SessionAuth {
    async fn authenticate(&self, request: &RequestParts) -> AuthAttempt {
        let Some(token) = self.token(request) else {
            return AuthAttempt::NoCredentials;
        };
        match self.store.lookup(&token).await {
            Some(session) => self.principal_for(session.user_id).await,
            None => AuthAttempt::Rejected(RejectReason::SessionNotFound),
        }
    }

    async fn create_session(&self, user_id: Uuid) -> Result<Option<String>> {
        Ok(Some(self.store.create(user_id).await?))
    }

    async fn destroy_session(&self, request: &RequestParts) -> bool {
        match self.token(request) {
            Some(token) => self.store.destroy(&token).await,
            None => false,
        }
    }
}

/// Session strategy with a configured lifetime.
///
/// Expiry is a judgment made when a session is read, never an eager sweep:
/// expired records stay in the store and are simply treated as absent.
pub struct ExpiringSessionAuth {
    sessions: SessionAuth,
    session_duration: i64,
}

impl ExpiringSessionAuth {
    /// A non-positive `session_duration` means sessions never expire.
    #[must_use]
    pub fn new(sessions: SessionAuth, session_duration: i64) -> Self {
        Self {
            sessions,
            session_duration,
        }
    }

    pub(crate) fn expired(&self, created_at_unix: i64) -> bool {
        self.expired_at(created_at_unix, now_unix())
    }

    fn expired_at(&self, created_at_unix: i64, now: i64) -> bool {
        self.session_duration > 0 && now > created_at_unix + self.session_duration
    }

    fn token(&self, request: &RequestParts) -> Option<String> {
        self.sessions.token(request)
    }

    fn store(&self) -> &SessionStore {
        self.sessions.store()
    }

    async fn principal_for(&self, user_id: Uuid) -> AuthAttempt {
        self.sessions.principal_for(user_id).await
    }
}

#[async_trait]
impl AuthStrategy for ExpiringSessionAuth {
    async fn authenticate(&self, request: &RequestParts) -> AuthAttempt {
        let Some(token) = self.token(request) else {
            return AuthAttempt::NoCredentials;
        };
        let Some(session) = self.store().lookup(&token).await else {
            return AuthAttempt::Rejected(RejectReason::SessionNotFound);
        };
        if self.expired(session.created_at_unix) {
            return AuthAttempt::Rejected(RejectReason::SessionExpired);
        }
        self.principal_for(session.user_id).await
    }

    async fn create_session(&self, user_id: Uuid) -> Result<Option<String>> {
        self.sessions.create_session(user_id).await
    }

    async fn destroy_session(&self, request: &RequestParts) -> bool {
        self.sessions.destroy_session(request).await
    }
}

/// Expiring sessions mirrored to durable records.
///
/// The durable store is authoritative: resolution and destruction read the
/// persisted `created_at`, not the in-memory copy. The in-memory store is a
/// warm cache, restored from the backing at startup.
pub struct PersistedSessionAuth {
    sessions: ExpiringSessionAuth,
    backing: Arc<dyn SessionBacking>,
}

impl PersistedSessionAuth {
    #[must_use]
    pub fn new(sessions: ExpiringSessionAuth, backing: Arc<dyn SessionBacking>) -> Self {
        Self { sessions, backing }
    }

    /// Load every persisted session into the in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing cannot be read.
    pub async fn restore(&self) -> Result<usize> {
        let records = self
            .backing
            .load_all()
            .await
            .context("failed to load persisted sessions")?;
        let count = records.len();
        for record in records {
            self.sessions.store().insert(record).await;
        }
        Ok(count)
    }
}

#[async_trait]
impl AuthStrategy for PersistedSessionAuth {
    async fn authenticate(&self, request: &RequestParts) -> AuthAttempt {
        let Some(token) = self.sessions.token(request) else {
            return AuthAttempt::NoCredentials;
        };
        let record = match self.backing.find_by_session_id(&token).await {
            Ok(record) => record,
            Err(err) => {
                error!("Session record lookup failed: {err:#}");
                return AuthAttempt::Rejected(RejectReason::Collaborator);
            }
        };
        // A token without a durable record is "no session", not an error.
        let Some(record) = record else {
            return AuthAttempt::Rejected(RejectReason::SessionNotFound);
        };
        if self.sessions.expired(record.created_at_unix) {
            return AuthAttempt::Rejected(RejectReason::SessionExpired);
        }
        self.sessions.principal_for(record.user_id).await
    }

    async fn create_session(&self, user_id: Uuid) -> Result<Option<String>> {
        // The durable record follows immediately after the in-memory entry.
        let Some(token) = self.sessions.create_session(user_id).await? else {
            return Ok(None);
        };
        let Some(session) = self.sessions.store().lookup(&token).await else {
            return Err(anyhow!("created session vanished before persistence"));
        };
        self.backing
            .put(&session)
            .await
            .context("failed to persist session")?;
        Ok(Some(token))
    }

    async fn destroy_session(&self, request: &RequestParts) -> bool {
        let Some(token) = self.sessions.token(request) else {
            return false;
        };
        let record = match self.backing.find_by_session_id(&token).await {
            Ok(Some(record)) => record,
            Ok(None) => return false,
            Err(err) => {
                error!("Session record lookup failed: {err:#}");
                return false;
            }
        };
        if self.sessions.expired(record.created_at_unix) {
            return false;
        }
        if !matches!(
            self.sessions.principal_for(record.user_id).await,
            AuthAttempt::Granted(_)
        ) {
            return false;
        }
        let removed = match self.backing.delete(&token).await {
            Ok(removed) => removed,
            Err(err) => {
                error!("Failed to delete session record: {err:#}");
                false
            }
        };
        // Drop the cached entry either way; the durable store is the truth.
        self.sessions.store().destroy(&token).await;
        removed
    }
}

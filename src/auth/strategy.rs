//! Interchangeable authentication mechanisms.
//!
//! Each strategy answers "who is the authenticated principal for this
//! request, if any". Variants build on one another by composition: the
//! session strategy wraps the store, the expiring strategy decorates it with
//! a read-time expiry judgment, and the persisted strategy layers durable
//! records on top of that.

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use super::backing::SessionBacking;
use super::basic::BasicAuth;
use super::config::AuthConfig;
use super::directory::{User, UserDirectory};
use super::request::RequestParts;
use super::session::{ExpiringSessionAuth, PersistedSessionAuth, SessionAuth};
use super::store::SessionStore;

/// Authenticated identity resolved for a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Why an attempt was rejected. Diagnostics only; never surfaced to clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    MalformedCredential,
    UnknownUser,
    WrongSecret,
    SessionNotFound,
    SessionExpired,
    Collaborator,
}

/// Result of asking a strategy who the caller is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthAttempt {
    /// Credential material was present and valid.
    Granted(Principal),
    /// No credential material was presented at all.
    NoCredentials,
    /// Credential material was presented but rejected.
    Rejected(RejectReason),
}

#[async_trait]
pub trait AuthStrategy: Send + Sync {
    async fn authenticate(&self, request: &RequestParts) -> AuthAttempt;

    /// Open a session for the user. Strategies without sessions return
    /// `Ok(None)`.
    async fn create_session(&self, _user_id: Uuid) -> Result<Option<String>> {
        Ok(None)
    }

    /// Destroy the session referenced by the request, returning whether one
    /// was removed.
    async fn destroy_session(&self, _request: &RequestParts) -> bool {
        false
    }
}

/// Which mechanism the gateway runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    Basic,
    Session,
    ExpiringSession,
    PersistedSession,
}

impl StrategyKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Session => "session",
            Self::ExpiringSession => "expiring",
            Self::PersistedSession => "persisted",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "session" => Ok(Self::Session),
            "expiring" => Ok(Self::ExpiringSession),
            "persisted" => Ok(Self::PersistedSession),
            other => Err(anyhow::anyhow!(
                "unknown auth strategy: {other} (expected basic, session, expiring or persisted)"
            )),
        }
    }
}

/// Assemble the configured strategy over its collaborators.
///
/// The persisted strategy warms the in-memory store from durable records
/// before serving requests.
///
/// # Errors
///
/// Returns an error when loading persisted sessions fails.
pub async fn build_strategy(
    config: &AuthConfig,
    store: Arc<SessionStore>,
    directory: Arc<dyn UserDirectory>,
    backing: Arc<dyn SessionBacking>,
) -> Result<Arc<dyn AuthStrategy>> {
    let sessions = || SessionAuth::new(config.cookie_name(), store.clone(), directory.clone());
    match config.strategy() {
        StrategyKind::Basic => Ok(Arc::new(BasicAuth::new(directory.clone()))),
        StrategyKind::Session => Ok(Arc::new(sessions())),
        StrategyKind::ExpiringSession => Ok(Arc::new(ExpiringSessionAuth::new(
            sessions(),
            config.session_duration_seconds(),
        ))),
        StrategyKind::PersistedSession => {
            let strategy = PersistedSessionAuth::new(
                ExpiringSessionAuth::new(sessions(), config.session_duration_seconds()),
                backing,
            );
            strategy.restore().await?;
            Ok(Arc::new(strategy))
        }
    }
}

//! In-memory session store.
//!
//! Owns the map of live sessions. Tokens are collision-resistant random
//! values; expiry is layered on top by the strategies, never judged here.

use anyhow::{anyhow, Context, Result};
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Attempts to generate a token that does not collide with a live session.
const TOKEN_RETRIES: usize = 3;

/// A live session. Never mutated after creation except by deletion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub session_id: String,
    pub user_id: Uuid,
    pub created_at_unix: i64,
}

/// Current time in unix seconds.
pub(crate) fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
        })
}

/// Create a new session token.
/// The raw value is only handed to the client; the store keys sessions by it.
pub(crate) fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for the user and return its token.
    ///
    /// # Errors
    ///
    /// Returns an error only when token generation is exhausted, which in
    /// practice does not happen with 256-bit random tokens.
    pub async fn create(&self, user_id: Uuid) -> Result<String> {
        for _ in 0..TOKEN_RETRIES {
            let token = generate_session_token()?;
            let mut sessions = self.sessions.write().await;
            if sessions.contains_key(&token) {
                continue;
            }
            sessions.insert(
                token.clone(),
                Session {
                    session_id: token.clone(),
                    user_id,
                    created_at_unix: now_unix(),
                },
            );
            return Ok(token);
        }
        Err(anyhow!("failed to generate unique session token"))
    }

    /// The session for a token, if one is live.
    pub async fn lookup(&self, session_id: &str) -> Option<Session> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Remove a session, returning whether one was removed.
    pub async fn destroy(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Insert an existing record, used to warm the store from durable
    /// session records at startup.
    pub async fn insert(&self, session: Session) {
        self.sessions
            .write()
            .await
            .insert(session.session_id.clone(), session);
    }
}

//! User directory boundary and the secret hash capability.
//!
//! The directory is an external collaborator; the core only needs lookups
//! and the opaque hash/verify pair. Secrets are stored as PHC strings and
//! raw values never leave the verification call.

use anyhow::{anyhow, Context, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use password_hash::{PasswordHash, SaltString};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A directory entry: identity plus the PHC-encoded secret hash.
#[derive(Clone, Debug)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub secret_hash: String,
}

impl User {
    /// Verify a candidate secret against the stored hash.
    #[must_use]
    pub fn verify_secret(&self, secret: &str) -> bool {
        PasswordHash::new(&self.secret_hash).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(secret.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

/// Hash a secret for storage; only the PHC string is ever persisted.
///
/// # Errors
///
/// Returns an error if salt generation or hashing fails.
pub fn hash_secret(secret: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut salt_bytes)
        .context("failed to generate salt")?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|err| anyhow!(err.to_string()))?;
    let phc = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|err| anyhow!(err.to_string()))?
        .to_string();
    Ok(phc)
}

/// Outcome when inserting a new user.
#[derive(Debug)]
pub enum InsertOutcome {
    Created(User),
    Conflict,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Users matching an email-like identifier; every match is a candidate.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Vec<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Insert a new user with an already-hashed secret.
    async fn insert(&self, email: &str, secret_hash: &str) -> Result<InsertOutcome>;
}

/// Verify an (identifier, secret) pair against the directory.
///
/// Returns the first user whose stored hash matches; `Ok(None)` covers both
/// unknown identifiers and wrong secrets.
///
/// # Errors
///
/// Returns an error when the directory lookup itself fails.
pub async fn verify_credentials(
    directory: &dyn UserDirectory,
    identifier: &str,
    secret: &str,
) -> Result<Option<User>> {
    let users = directory
        .find_by_identifier(identifier)
        .await
        .context("directory lookup failed")?;
    Ok(users.into_iter().find(|user| user.verify_secret(secret)))
}

/// Directory backed by process memory, used when no database is configured
/// and by tests.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|user| user.email == identifier)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, email: &str, secret_hash: &str) -> Result<InsertOutcome> {
        let mut users = self.users.write().await;
        if users.values().any(|user| user.email == email) {
            return Ok(InsertOutcome::Conflict);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            secret_hash: secret_hash.to_string(),
        };
        users.insert(user.id, user.clone());
        Ok(InsertOutcome::Created(user))
    }
}

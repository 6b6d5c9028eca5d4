//! Entry point deciding whether a request may proceed and as whom.

use std::sync::Arc;
use tracing::debug;

use super::exclusions::{requires_auth, ExclusionPattern};
use super::request::RequestParts;
use super::strategy::{AuthAttempt, AuthStrategy, Principal};

/// Externally visible authentication failure.
///
/// The HTTP layer maps `Unauthorized` to 401 and `Forbidden` to 403; no
/// other internal failure detail crosses this boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthFailure {
    /// No credential material was presented.
    Unauthorized,
    /// Credential material was presented but rejected.
    Forbidden,
}

/// Successful authorization outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access {
    /// The path is excluded from authentication.
    Public,
    /// The request authenticated as this principal.
    Authenticated(Principal),
}

/// Consults the path exclusions, then the configured strategy.
///
/// Constructed once at startup with its collaborators injected; request
/// handlers share it behind an `Arc`.
pub struct AuthGateway {
    strategy: Arc<dyn AuthStrategy>,
    excluded: Vec<ExclusionPattern>,
}

impl AuthGateway {
    #[must_use]
    pub fn new(strategy: Arc<dyn AuthStrategy>, excluded: Vec<ExclusionPattern>) -> Self {
        Self { strategy, excluded }
    }

    /// Authorize a request.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when no credential material was presented and
    /// `Forbidden` when it was presented but rejected.
    pub async fn authorize(&self, request: &RequestParts) -> Result<Access, AuthFailure> {
        if !requires_auth(request.path(), &self.excluded) {
            return Ok(Access::Public);
        }
        match self.strategy.authenticate(request).await {
            AuthAttempt::Granted(principal) => Ok(Access::Authenticated(principal)),
            AuthAttempt::NoCredentials => Err(AuthFailure::Unauthorized),
            AuthAttempt::Rejected(reason) => {
                debug!("Authentication rejected: {reason:?}");
                Err(AuthFailure::Forbidden)
            }
        }
    }
}

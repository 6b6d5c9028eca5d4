//! Static credential authentication from the Authorization header.
//!
//! Credentials are decoded per request and never stored: scheme check,
//! base64 decode, first-colon split, then a directory verify. The steps
//! compose strictly left to right and any failure short-circuits to a
//! non-granted attempt.

use async_trait::async_trait;
use base64::Engine;
use std::sync::Arc;
use tracing::error;

use super::directory::UserDirectory;
use super::request::RequestParts;
use super::strategy::{AuthAttempt, AuthStrategy, Principal, RejectReason};

/// Scheme prefix, case-sensitive, single space.
const BASIC_SCHEME: &str = "Basic ";

/// The credential token iff the header uses the `Basic` scheme.
pub(crate) fn extract_basic_token(header_value: &str) -> Option<&str> {
    header_value.strip_prefix(BASIC_SCHEME)
}

/// Decode the credential token. Malformed base64 or invalid UTF-8 is an
/// authentication failure, not a system failure.
pub(crate) fn decode_token(token: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(token).ok()?;
    String::from_utf8(bytes).ok()
}

/// Split decoded credentials on the first colon; the secret may itself
/// contain colons.
pub(crate) fn split_credentials(decoded: &str) -> Option<(&str, &str)> {
    decoded.split_once(':')
}

/// Authenticates every request from its Authorization header. No sessions.
pub struct BasicAuth {
    directory: Arc<dyn UserDirectory>,
}

impl BasicAuth {
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl AuthStrategy for BasicAuth {
    async fn authenticate(&self, request: &RequestParts) -> AuthAttempt {
        let Some(header) = request.authorization() else {
            return AuthAttempt::NoCredentials;
        };
        let Some(decoded) = extract_basic_token(header).and_then(decode_token) else {
            return AuthAttempt::Rejected(RejectReason::MalformedCredential);
        };
        let Some((identifier, secret)) = split_credentials(&decoded) else {
            return AuthAttempt::Rejected(RejectReason::MalformedCredential);
        };

        let users = match self.directory.find_by_identifier(identifier).await {
            Ok(users) => users,
            Err(err) => {
                error!("User lookup failed: {err:#}");
                return AuthAttempt::Rejected(RejectReason::Collaborator);
            }
        };
        if users.is_empty() {
            return AuthAttempt::Rejected(RejectReason::UnknownUser);
        }
        match users.iter().find(|user| user.verify_secret(secret)) {
            Some(user) => AuthAttempt::Granted(Principal::from(user)),
            None => AuthAttempt::Rejected(RejectReason::WrongSecret),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_token, extract_basic_token, split_credentials, BasicAuth};
    use crate::auth::directory::{hash_secret, MemoryUserDirectory, UserDirectory};
    use crate::auth::request::RequestParts;
    use crate::auth::strategy::{AuthAttempt, AuthStrategy, RejectReason};
    use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use std::sync::Arc;

    #[test]
    fn extracts_token_for_basic_scheme_only() {
        assert_eq!(
            extract_basic_token("Basic QWxhZGRpbjpvcGVuc2VzYW1l"),
            Some("QWxhZGRpbjpvcGVuc2VzYW1l")
        );
        assert_eq!(extract_basic_token("Bearer xyz"), None);
        assert_eq!(extract_basic_token("basic xyz"), None);
        assert_eq!(extract_basic_token("Basic"), None);
    }

    #[test]
    fn decode_round_trips_utf8() {
        let encoded = STANDARD.encode("user@example.com");
        assert_eq!(decode_token(&encoded).as_deref(), Some("user@example.com"));
        assert_eq!(decode_token("not-base64!!!"), None);
        assert_eq!(decode_token(&STANDARD.encode([0xffu8, 0xfe])), None);
    }

    #[test]
    fn splits_on_first_colon_only() {
        assert_eq!(split_credentials("user:pass:word"), Some(("user", "pass:word")));
        assert_eq!(split_credentials("no-colon"), None);
        assert_eq!(split_credentials(":starts-with-colon"), Some(("", "starts-with-colon")));
    }

    #[test]
    fn rfc_example_decodes_to_aladdin() {
        let decoded = decode_token("QWxhZGRpbjpvcGVuc2VzYW1l").expect("decode");
        assert_eq!(split_credentials(&decoded), Some(("Aladdin", "opensesame")));
    }

    fn request_with_authorization(value: String) -> RequestParts {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).expect("header"));
        RequestParts::new("/v1/users/me", headers)
    }

    async fn directory_with_user(email: &str, password: &str) -> Arc<MemoryUserDirectory> {
        let directory = Arc::new(MemoryUserDirectory::new());
        let hash = hash_secret(password).expect("hash");
        directory.insert(email, &hash).await.expect("insert");
        directory
    }

    #[tokio::test]
    async fn grants_valid_credentials() {
        let directory = directory_with_user("alice@example.com", "open:sesame").await;
        let strategy = BasicAuth::new(directory);

        let token = STANDARD.encode("alice@example.com:open:sesame");
        let attempt = strategy
            .authenticate(&request_with_authorization(format!("Basic {token}")))
            .await;
        let AuthAttempt::Granted(principal) = attempt else {
            panic!("expected grant, got {attempt:?}");
        };
        assert_eq!(principal.email, "alice@example.com");
    }

    #[tokio::test]
    async fn missing_header_is_no_credentials() {
        let directory = directory_with_user("alice@example.com", "pw").await;
        let strategy = BasicAuth::new(directory);
        let request = RequestParts::new("/v1/users/me", HeaderMap::new());
        assert_eq!(strategy.authenticate(&request).await, AuthAttempt::NoCredentials);
    }

    #[tokio::test]
    async fn wrong_scheme_and_bad_encoding_are_rejected() {
        let directory = directory_with_user("alice@example.com", "pw").await;
        let strategy = BasicAuth::new(directory);

        for header in ["Bearer abc", "Basic %%%", "Basic bm8tY29sb24"] {
            let attempt = strategy
                .authenticate(&request_with_authorization(header.to_string()))
                .await;
            assert_eq!(
                attempt,
                AuthAttempt::Rejected(RejectReason::MalformedCredential),
                "header {header:?}"
            );
        }
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_secret_are_distinct_rejections() {
        let directory = directory_with_user("alice@example.com", "pw").await;
        let strategy = BasicAuth::new(directory);

        let unknown = STANDARD.encode("ghost@example.com:pw");
        assert_eq!(
            strategy
                .authenticate(&request_with_authorization(format!("Basic {unknown}")))
                .await,
            AuthAttempt::Rejected(RejectReason::UnknownUser)
        );

        let wrong = STANDARD.encode("alice@example.com:nope");
        assert_eq!(
            strategy
                .authenticate(&request_with_authorization(format!("Basic {wrong}")))
                .await,
            AuthAttempt::Rejected(RejectReason::WrongSecret)
        );
    }
}

//! Session endpoints for cookie auth.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::types::SessionResponse;
use crate::api::AppState;
use crate::auth::{request::RequestParts, AuthAttempt, AuthConfig};

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, state: Extension<Arc<AppState>>) -> impl IntoResponse {
    // Missing or rejected cookies are "no session" to avoid leaking auth state.
    let parts = RequestParts::new("/v1/auth/session", headers);
    match state.strategy.authenticate(&parts).await {
        AuthAttempt::Granted(principal) => (
            StatusCode::OK,
            Json(SessionResponse {
                user_id: principal.user_id.to_string(),
                email: principal.email,
            }),
        )
            .into_response(),
        AuthAttempt::NoCredentials | AuthAttempt::Rejected(_) => {
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(headers: HeaderMap, state: Extension<Arc<AppState>>) -> impl IntoResponse {
    let parts = RequestParts::new("/v1/auth/logout", headers);
    state.strategy.destroy_session(&parts).await;

    // Always clear the cookie, even if no session was found.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(&state.config) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

/// Build a secure `HttpOnly` cookie for the session token.
pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{}={token}; Path=/; HttpOnly; SameSite=Lax",
        config.cookie_name()
    );
    let duration = config.session_duration_seconds();
    if duration > 0 {
        cookie.push_str(&format!("; Max-Age={duration}"));
    }
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.cookie_name()
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

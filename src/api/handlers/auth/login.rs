//! Credential login issuing a session cookie.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, error};

use super::session::session_cookie;
use super::types::LoginRequest;
use crate::api::handlers::normalize_email;
use crate::api::AppState;
use crate::auth::directory::verify_credentials;
use crate::redact;

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 204, description = "Session issued; token set as a cookie"),
        (status = 401, description = "Unknown user or wrong password"),
        (status = 501, description = "The active strategy does not issue sessions")
    ),
    tag = "auth"
)]
pub async fn login(
    state: Extension<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    let email = normalize_email(&request.email);
    debug!(
        "{}",
        redact::scrub(&format!(
            "login attempt; email={email}; password={};",
            request.password
        ))
    );

    let user = match verify_credentials(state.directory.as_ref(), &email, &request.password).await
    {
        Ok(Some(user)) => user,
        Ok(None) => return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
        Err(err) => {
            // Collaborator failures downgrade to an auth failure; only log the cause.
            error!("Credential verification failed: {err:#}");
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    };

    let token = match state.strategy.create_session(user.id).await {
        Ok(Some(token)) => token,
        Ok(None) => {
            return (
                StatusCode::NOT_IMPLEMENTED,
                "Sessions are not enabled for this strategy",
            )
                .into_response()
        }
        Err(err) => {
            error!("Failed to create session: {err:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed").into_response();
        }
    };

    let mut response_headers = HeaderMap::new();
    match session_cookie(&state.config, &token) {
        Ok(cookie) => {
            // Attach the cookie so the client can present it on future requests.
            response_headers.insert(SET_COOKIE, cookie);
            (StatusCode::NO_CONTENT, response_headers).into_response()
        }
        Err(err) => {
            error!("Failed to set session cookie: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Login failed").into_response()
        }
    }
}

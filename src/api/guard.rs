//! Authentication guard applied in front of every route.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

use super::AppState;
use crate::auth::{Access, AuthFailure};
use crate::auth::request::RequestParts;

/// Authorize the request before it reaches a handler.
///
/// Public paths pass through untouched; authenticated requests carry their
/// `Principal` in the request extensions; everything else is answered here
/// with 401 or 403.
pub(crate) async fn require_auth(mut request: Request, next: Next) -> Response {
    let Some(state) = request.extensions().get::<Arc<AppState>>().cloned() else {
        error!("Auth state missing from request extensions");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let parts = RequestParts::new(request.uri().path(), request.headers().clone());
    match state.gateway.authorize(&parts).await {
        Ok(Access::Public) => next.run(request).await,
        Ok(Access::Authenticated(principal)) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(AuthFailure::Unauthorized) => {
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
        Err(AuthFailure::Forbidden) => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
    }
}

//! OpenAPI document assembly, served at `/v1/openapi.json`.

use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::users::register,
        crate::api::handlers::users::me,
        crate::api::handlers::auth::login::login,
        crate::api::handlers::auth::session::session,
        crate::api::handlers::auth::session::logout,
    ),
    components(schemas(
        crate::api::handlers::health::Health,
        crate::api::handlers::users::RegisterRequest,
        crate::api::handlers::users::RegisterResponse,
        crate::api::handlers::users::ProfileResponse,
        crate::api::handlers::auth::types::LoginRequest,
        crate::api::handlers::auth::types::SessionResponse,
    )),
    tags(
        (name = "auth", description = "Login, logout and session introspection"),
        (name = "users", description = "Registration and profile"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub async fn serve() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/v1/users",
            "/v1/users/me",
            "/v1/auth/login",
            "/v1/auth/logout",
            "/v1/auth/session",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}

//! User registration and the authenticated profile.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use super::{normalize_email, valid_email};
use crate::api::AppState;
use crate::auth::directory::{hash_secret, InsertOutcome};
use crate::auth::Principal;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub email: String,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProfileResponse {
    pub user_id: String,
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid email or password")
    ),
    tag = "users"
)]
pub async fn register(
    state: Extension<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> impl IntoResponse {
    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Invalid email").into_response();
    }
    if request.password.is_empty() {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Missing password").into_response();
    }

    let secret_hash = match hash_secret(&request.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err:#}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match state.directory.insert(&email, &secret_hash).await {
        Ok(InsertOutcome::Created(user)) => (
            StatusCode::CREATED,
            Json(RegisterResponse {
                email: user.email,
                message: "user created".to_string(),
            }),
        )
            .into_response(),
        Ok(InsertOutcome::Conflict) => {
            (StatusCode::CONFLICT, "Email already registered").into_response()
        }
        Err(err) => {
            error!("Failed to insert user: {err:#}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/users/me",
    responses(
        (status = 200, description = "Authenticated profile", body = ProfileResponse),
        (status = 401, description = "No credentials presented"),
        (status = 403, description = "Credentials rejected")
    ),
    tag = "users"
)]
pub async fn me(principal: Extension<Principal>) -> impl IntoResponse {
    Json(ProfileResponse {
        user_id: principal.user_id.to_string(),
        email: principal.email.clone(),
    })
}

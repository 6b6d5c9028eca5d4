//! HTTP surface: router, middleware stack, and server bootstrap.

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;

use crate::auth::{
    backing::{MemorySessionBacking, SessionBacking},
    directory::{MemoryUserDirectory, UserDirectory},
    gateway::AuthGateway,
    storage::{PgSessionBacking, PgUserDirectory},
    store::SessionStore,
    strategy::build_strategy,
    AuthConfig, AuthStrategy,
};

mod guard;
pub(crate) mod handlers;
mod openapi;

/// Shared state handed to handlers and the auth guard.
pub struct AppState {
    pub(crate) gateway: AuthGateway,
    pub(crate) strategy: Arc<dyn AuthStrategy>,
    pub(crate) directory: Arc<dyn UserDirectory>,
    pub(crate) config: AuthConfig,
    pub(crate) pool: Option<PgPool>,
}

/// Wire the collaborators for the configured strategy.
///
/// With a DSN the directory and session backing live in Postgres; without
/// one everything runs on the in-memory implementations.
///
/// # Errors
///
/// Returns an error if the database connection or session restore fails.
pub async fn build_state(dsn: Option<String>, config: AuthConfig) -> Result<Arc<AppState>> {
    let (directory, backing, pool): (
        Arc<dyn UserDirectory>,
        Arc<dyn SessionBacking>,
        Option<PgPool>,
    ) = match dsn {
        Some(dsn) => {
            let pool = PgPoolOptions::new()
                .min_connections(1)
                .max_connections(5)
                .max_lifetime(Duration::from_secs(60 * 2))
                .test_before_acquire(true)
                .connect(&dsn)
                .await
                .context("Failed to connect to database")?;
            (
                Arc::new(PgUserDirectory::new(pool.clone())),
                Arc::new(PgSessionBacking::new(pool.clone())),
                Some(pool),
            )
        }
        None => {
            info!("No DSN configured; using in-memory stores");
            (
                Arc::new(MemoryUserDirectory::new()),
                Arc::new(MemorySessionBacking::new()),
                None,
            )
        }
    };

    let store = Arc::new(SessionStore::new());
    let strategy = build_strategy(&config, store, directory.clone(), backing).await?;
    let gateway = AuthGateway::new(strategy.clone(), config.excluded_paths().to_vec());

    Ok(Arc::new(AppState {
        gateway,
        strategy,
        directory,
        config,
        pool,
    }))
}

/// Build the application router over the given state.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/v1/openapi.json", get(openapi::serve))
        .route("/v1/users", post(handlers::users::register))
        .route("/v1/users/me", get(handlers::users::me))
        .route("/v1/auth/login", post(handlers::auth::login))
        .route("/v1/auth/logout", post(handlers::auth::logout))
        .route("/v1/auth/session", get(handlers::auth::session))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state))
                .layer(middleware::from_fn(guard::require_auth)),
        )
}

/// Start the server.
///
/// # Errors
///
/// Returns an error if state wiring, binding, or serving fails.
pub async fn new(port: u16, dsn: Option<String>, config: AuthConfig) -> Result<()> {
    let state = build_state(dsn, config).await?;
    let app = router(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to install shutdown handler: {err}");
    }
    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

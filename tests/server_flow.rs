//! End-to-end flows over the full router against the in-memory stores.

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use gardisto::api;
use gardisto::auth::{AuthConfig, StrategyKind};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const EMAIL: &str = "bob@example.com";
const PASSWORD: &str = "H0ldTheDoor98!";

async fn app(config: AuthConfig) -> Router {
    let state = api::build_state(None, config).await.expect("state");
    api::router(state)
}

async fn session_app(strategy: StrategyKind) -> Router {
    app(AuthConfig::new().with_strategy(strategy)).await
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn register(app: &Router, email: &str, password: &str) -> StatusCode {
    let response = app
        .clone()
        .oneshot(json_request(
            "/v1/users",
            json!({ "email": email, "password": password }),
        ))
        .await
        .expect("response");
    response.status()
}

async fn login(app: &Router, email: &str, password: &str) -> Response<Body> {
    app.clone()
        .oneshot(json_request(
            "/v1/auth/login",
            json!({ "email": email, "password": password }),
        ))
        .await
        .expect("response")
}

/// The `name=value` pair from a Set-Cookie response header.
fn session_cookie_pair(response: &Response<Body>) -> String {
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .expect("utf8");
    cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .trim()
        .to_string()
}

async fn get_profile(app: &Router, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri("/v1/users/me");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).expect("request"))
        .await
        .expect("response")
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn register_login_profile_logout_flow() {
    let app = session_app(StrategyKind::Session).await;

    assert_eq!(register(&app, EMAIL, PASSWORD).await, StatusCode::CREATED);
    assert_eq!(register(&app, EMAIL, PASSWORD).await, StatusCode::CONFLICT);

    // Wrong password never yields a cookie.
    let rejected = login(&app, EMAIL, "wrong").await;
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);

    let accepted = login(&app, EMAIL, PASSWORD).await;
    assert_eq!(accepted.status(), StatusCode::NO_CONTENT);
    let cookie = session_cookie_pair(&accepted);

    // Protected profile with the session cookie.
    let profile = get_profile(&app, Some(&cookie)).await;
    assert_eq!(profile.status(), StatusCode::OK);
    let body = json_body(profile).await;
    assert_eq!(body["email"], EMAIL);

    // No cookie at all: nothing was presented.
    assert_eq!(
        get_profile(&app, None).await.status(),
        StatusCode::UNAUTHORIZED
    );

    // A cookie that resolves to nothing: presented but rejected.
    assert_eq!(
        get_profile(&app, Some("gardisto_session=garbage"))
            .await
            .status(),
        StatusCode::FORBIDDEN
    );

    // Logout destroys the session and clears the cookie.
    let logout = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/auth/logout")
                .header(COOKIE, &cookie)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    let cleared = logout
        .headers()
        .get(SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .expect("utf8");
    assert!(cleared.contains("Max-Age=0"));

    assert_eq!(
        get_profile(&app, Some(&cookie)).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn session_introspection_reports_current_state() {
    let app = session_app(StrategyKind::Session).await;
    register(&app, EMAIL, PASSWORD).await;
    let cookie = session_cookie_pair(&login(&app, EMAIL, PASSWORD).await);

    let with_cookie = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/auth/session")
                .header(COOKIE, &cookie)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(with_cookie.status(), StatusCode::OK);
    let body = json_body(with_cookie).await;
    assert_eq!(body["email"], EMAIL);

    let without_cookie = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/auth/session")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(without_cookie.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn expired_session_cookie_is_forbidden() {
    let app = app(AuthConfig::new()
        .with_strategy(StrategyKind::ExpiringSession)
        .with_session_duration_seconds(1))
    .await;

    register(&app, EMAIL, PASSWORD).await;
    let response = login(&app, EMAIL, PASSWORD).await;
    let cookie = session_cookie_pair(&response);
    assert!(response
        .headers()
        .get(SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .expect("utf8")
        .contains("Max-Age=1"));

    // Fresh session resolves.
    assert_eq!(
        get_profile(&app, Some(&cookie)).await.status(),
        StatusCode::OK
    );

    // Strictly past created_at + duration.
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    assert_eq!(
        get_profile(&app, Some(&cookie)).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn persisted_strategy_survives_logout_round_trip() {
    let app = session_app(StrategyKind::PersistedSession).await;

    register(&app, EMAIL, PASSWORD).await;
    let cookie = session_cookie_pair(&login(&app, EMAIL, PASSWORD).await);
    assert_eq!(
        get_profile(&app, Some(&cookie)).await.status(),
        StatusCode::OK
    );

    let logout = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/auth/logout")
                .header(COOKIE, &cookie)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        get_profile(&app, Some(&cookie)).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn basic_strategy_authenticates_the_authorization_header() {
    let app = session_app(StrategyKind::Basic).await;
    register(&app, EMAIL, PASSWORD).await;

    let token = STANDARD.encode(format!("{EMAIL}:{PASSWORD}"));
    let ok = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/users/me")
                .header(AUTHORIZATION, format!("Basic {token}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(ok.status(), StatusCode::OK);
    let body = json_body(ok).await;
    assert_eq!(body["email"], EMAIL);

    let wrong = STANDARD.encode(format!("{EMAIL}:nope"));
    let forbidden = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/users/me")
                .header(AUTHORIZATION, format!("Basic {wrong}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    assert_eq!(
        get_profile(&app, None).await.status(),
        StatusCode::UNAUTHORIZED
    );

    // Sessions are not part of the basic strategy's contract.
    let login = login(&app, EMAIL, PASSWORD).await;
    assert_eq!(login.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn health_and_openapi_are_public() {
    let app = session_app(StrategyKind::Session).await;

    let health = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(health.status(), StatusCode::OK);
    assert!(health.headers().contains_key("x-app"));
    let body = json_body(health).await;
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["name"], "gardisto");

    let openapi = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/openapi.json")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(openapi.status(), StatusCode::OK);
    let doc = json_body(openapi).await;
    assert!(doc["paths"]["/v1/auth/login"].is_object());
}

#[tokio::test]
async fn invalid_registration_input_is_rejected() {
    let app = session_app(StrategyKind::Session).await;
    assert_eq!(
        register(&app, "not-an-email", PASSWORD).await,
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        register(&app, EMAIL, "").await,
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use flightclock_api::config::ServerConfig;
use flightclock_api::router::build_app_router;
use flightclock_api::state::AppState;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "s3cret:pass";

/// Build a test `ServerConfig` with admin credentials configured.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        admin_user: Some(ADMIN_USER.to_string()),
        admin_pass: Some(ADMIN_PASS.to_string()),
        airports_data_path: "data/airports.json".to_string(),
        reseed_chunk_size: 500,
    }
}

/// Build the full application router, with the production middleware stack,
/// over the given pool.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: SqlitePool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// `Authorization` header value for the given credentials.
pub fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
}

pub fn admin_auth() -> String {
    basic(ADMIN_USER, ADMIN_PASS)
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

/// Anonymous GET.
pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// GET with admin credentials.
pub async fn get_admin(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header(header::AUTHORIZATION, admin_auth())
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send a JSON body with the given method and optional `Authorization` value.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: &Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

/// POST a JSON body with admin credentials.
pub async fn post_json(app: &Router, uri: &str, body: &Value) -> Response<Body> {
    send_json(app, "POST", uri, Some(&admin_auth()), body).await
}

/// PATCH a JSON body with admin credentials.
pub async fn patch_json(app: &Router, uri: &str, body: &Value) -> Response<Body> {
    send_json(app, "PATCH", uri, Some(&admin_auth()), body).await
}

/// POST without a body, with admin credentials.
pub async fn post_admin(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::post(uri)
        .header(header::AUTHORIZATION, admin_auth())
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create Changi (SIN) through the API.
pub async fn create_changi(app: &Router) -> Value {
    let response = post_json(
        app,
        "/api/v1/airports",
        &serde_json::json!({
            "iata": "SIN",
            "icao": "WSSS",
            "name": "Changi",
            "city": "Singapore",
            "country": "SG",
            "lat": 1.3644,
            "lon": 103.9915,
            "timezone": "Asia/Singapore",
            "reason": "initial load",
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}

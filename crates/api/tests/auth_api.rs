//! HTTP-level tests for Basic Auth on admin routes.

mod common;

use axum::http::{header, StatusCode};
use common::{
    basic, body_json, build_test_app, build_test_app_with, get, get_admin, send_json, test_config,
};
use serde_json::json;
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Test: admin route without credentials is challenged
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_credentials_returns_challenge(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = get(&app, "/api/v1/admin/airports").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        r#"Basic realm="Admin", charset="UTF-8""#
    );
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

// ---------------------------------------------------------------------------
// Test: wrong password is rejected and nothing is written
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_wrong_password_is_rejected(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = send_json(
        &app,
        "POST",
        "/api/v1/airports",
        Some(&basic("admin", "guess")),
        &json!({"iata": "SIN", "name": "Changi", "timezone": "Asia/Singapore", "reason": "x"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let lookup = get(&app, "/api/v1/airports/SIN").await;
    assert_eq!(lookup.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: admin access is disabled when credentials are not configured
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unconfigured_admin_rejects_everyone(pool: SqlitePool) {
    let mut config = test_config();
    config.admin_pass = None;
    let app = build_test_app_with(pool, config);

    let response = get_admin(&app, "/api/v1/admin/airports").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: valid credentials pass; public routes need none
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_valid_credentials_and_public_routes(pool: SqlitePool) {
    let app = build_test_app(pool);

    let admin = get_admin(&app, "/api/v1/admin/airports").await;
    assert_eq!(admin.status(), StatusCode::OK);

    let public = get(&app, "/api/v1/airports").await;
    assert_eq!(public.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: health is public and reports the database
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_reports_database(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["airports"], 0);
}

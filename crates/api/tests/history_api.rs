//! HTTP-level integration tests for the audit trail, snapshots, and the
//! rollback / rollback-to / restore actions.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use chrono::{SecondsFormat, Utc};
use common::{
    body_json, build_test_app, create_changi, get, get_admin, patch_json, post_admin, post_json,
};
use serde_json::json;
use sqlx::SqlitePool;

async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

fn now_param() -> String {
    Utc::now()
        .to_rfc3339_opts(SecondsFormat::Micros, true)
        .replace('+', "%2B")
}

// ---------------------------------------------------------------------------
// Test: audit query filters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_audit_filters(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;
    tick().await;
    patch_json(
        &app,
        "/api/v1/airports/SIN",
        &json!({"name": "Singapore Changi", "reason": "rename"}),
    )
    .await;

    let all = body_json(get_admin(&app, "/api/v1/airports/SIN/audit").await).await;
    assert_eq!(all.as_array().unwrap().len(), 8);
    assert_eq!(all[0]["field"], "name");
    assert_eq!(all[0]["new_value"], "Singapore Changi");

    let names = body_json(get_admin(&app, "/api/v1/airports/SIN/audit?field=name").await).await;
    assert_eq!(names.as_array().unwrap().len(), 2);

    let by_user = body_json(get_admin(&app, "/api/v1/airports/SIN/audit?user=ADM").await).await;
    assert_eq!(by_user.as_array().unwrap().len(), 8);

    let nobody = body_json(get_admin(&app, "/api/v1/airports/SIN/audit?user=zed").await).await;
    assert!(nobody.as_array().unwrap().is_empty());

    let future = body_json(
        get_admin(&app, "/api/v1/airports/SIN/audit?from=2999-01-01").await,
    )
    .await;
    assert!(future.as_array().unwrap().is_empty());

    let garbage_dates = body_json(
        get_admin(&app, "/api/v1/airports/SIN/audit?from=yesterday&to=soon").await,
    )
    .await;
    assert_eq!(garbage_dates.as_array().unwrap().len(), 8);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_reads_require_admin(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;

    assert_eq!(
        get(&app, "/api/v1/airports/SIN/audit").await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        get(&app, "/api/v1/airports/SIN/snapshots").await.status(),
        StatusCode::UNAUTHORIZED
    );
}

// ---------------------------------------------------------------------------
// Test: rollback of one audit entry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollback_entry(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;
    tick().await;
    let edited = body_json(
        patch_json(
            &app,
            "/api/v1/airports/SIN",
            &json!({"city": "Changi Village", "reason": "oops"}),
        )
        .await,
    )
    .await;
    let entry_id = edited["changes"][0]["id"].as_i64().unwrap();
    tick().await;

    let response = post_json(
        &app,
        &format!("/api/v1/airports/SIN/rollback?id={entry_id}"),
        &json!({"reason": "revert city"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["updated"]["city"], "Singapore");
    assert_eq!(json["changes"][0]["changed_by"], "admin (rollback)");
    assert_eq!(json["changes"][0]["reason"], "revert city");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollback_validation(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;

    let no_reason = post_admin(&app, "/api/v1/airports/SIN/rollback?id=1").await;
    assert_eq!(no_reason.status(), StatusCode::BAD_REQUEST);

    let no_id = post_admin(&app, "/api/v1/airports/SIN/rollback?reason=x").await;
    assert_eq!(no_id.status(), StatusCode::BAD_REQUEST);

    let unknown = post_admin(&app, "/api/v1/airports/SIN/rollback?id=9999&reason=x").await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollback_entry_of_other_airport_is_not_found(pool: SqlitePool) {
    let app = build_test_app(pool);
    let created = create_changi(&app).await;
    post_json(
        &app,
        "/api/v1/airports",
        &json!({"iata": "HND", "name": "Haneda", "timezone": "Asia/Tokyo", "reason": "new"}),
    )
    .await;
    let sin_entry = created["changes"][0]["id"].as_i64().unwrap();

    let response = post_admin(
        &app,
        &format!("/api/v1/airports/HND/rollback?id={sin_entry}&reason=x"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: point-in-time rollback
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollback_to(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;
    tick().await;
    let cutoff = now_param();
    tick().await;

    for name in ["First", "Second"] {
        patch_json(
            &app,
            "/api/v1/airports/SIN",
            &json!({"name": name, "lon": null, "reason": "churn"}),
        )
        .await;
        tick().await;
    }

    let response = post_admin(
        &app,
        &format!("/api/v1/airports/SIN/rollback-to?at={cutoff}&reason=undo"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["updated"]["name"], "Changi");
    assert_eq!(json["updated"]["lon"], 103.9915);
    assert!(json["at"].is_string());
    assert_eq!(json["changes"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollback_to_without_later_changes(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;
    tick().await;

    let response = post_admin(
        &app,
        &format!("/api/v1/airports/SIN/rollback-to?at={}&reason=undo", now_param()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(
        json["message"],
        "No changes after the specified time; nothing to roll back."
    );

    let snapshots = body_json(get_admin(&app, "/api/v1/airports/SIN/snapshots").await).await;
    assert_eq!(snapshots.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rollback_to_needs_valid_timestamp(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;

    let response =
        post_admin(&app, "/api/v1/airports/SIN/rollback-to?at=someday&reason=undo").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: snapshot restore
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_restore_snapshot(pool: SqlitePool) {
    let app = build_test_app(pool);
    let created = create_changi(&app).await;
    let snapshot_id = created["snapshot_id"].as_i64().unwrap();
    tick().await;
    patch_json(
        &app,
        "/api/v1/airports/SIN",
        &json!({"name": "Broken", "icao": null, "reason": "mess"}),
    )
    .await;
    tick().await;

    let response = post_json(
        &app,
        &format!("/api/v1/airports/SIN/restore?id={snapshot_id}"),
        &json!({"reason": "restore known good"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["updated"]["name"], "Changi");
    assert_eq!(json["updated"]["icao"], "WSSS");
    assert_eq!(json["changes"].as_array().unwrap().len(), 2);
    assert_eq!(json["changes"][0]["changed_by"], "admin (restore-snapshot)");

    let snapshots = body_json(get_admin(&app, "/api/v1/airports/SIN/snapshots?take=1").await).await;
    assert_eq!(snapshots.as_array().unwrap().len(), 1);
    assert_eq!(snapshots[0]["id"], json["snapshot_id"]);
    assert_eq!(snapshots[0]["data"]["name"], "Changi");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_restore_unknown_snapshot(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;

    let response = post_admin(&app, "/api/v1/airports/SIN/restore?id=424242&reason=x").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

//! HTTP-level integration tests for airport lookup, create and edit.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_changi, get, get_admin, patch_json, post_json, send_json,
};
use serde_json::json;
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// Test: create returns 201 and audits every field
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_airport(pool: SqlitePool) {
    let app = build_test_app(pool);
    let json = create_changi(&app).await;

    assert_eq!(json["ok"], true);
    assert_eq!(json["updated"]["iata"], "SIN");
    assert_eq!(json["updated"]["icao"], "WSSS");
    assert_eq!(json["changes"].as_array().unwrap().len(), 7);
    assert_eq!(json["changes"][0]["changed_by"], "admin");
    assert!(json["snapshot_id"].as_i64().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_duplicate_is_conflict(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;

    let response = post_json(
        &app,
        "/api/v1/airports",
        &json!({"iata": "sin", "name": "Again", "timezone": "Asia/Singapore", "reason": "dup"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_requires_reason_and_valid_zone(pool: SqlitePool) {
    let app = build_test_app(pool);

    let no_reason = post_json(
        &app,
        "/api/v1/airports",
        &json!({"iata": "SIN", "name": "Changi", "timezone": "Asia/Singapore"}),
    )
    .await;
    assert_eq!(no_reason.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(no_reason).await["error"], "Reason is required");

    let bad_zone = post_json(
        &app,
        "/api/v1/airports",
        &json!({"iata": "SIN", "name": "Changi", "timezone": "Mars/Base", "reason": "x"}),
    )
    .await;
    assert_eq!(bad_zone.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_accepts_padded_codes_and_numeric_strings(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = post_json(
        &app,
        "/api/v1/airports",
        &json!({
            "iata": " hnd",
            "icao": "rjtt ",
            "name": "Haneda",
            "lat": "35.5523",
            "lon": "139.7798",
            "timezone": "Asia/Tokyo",
            "reason": "manual entry",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["updated"]["iata"], "HND");
    assert_eq!(json["updated"]["icao"], "RJTT");
    assert_eq!(json["updated"]["lat"], 35.5523);
    assert_eq!(json["updated"]["lon"], 139.7798);
}

// ---------------------------------------------------------------------------
// Test: GET /airports/{iata}
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_by_iata(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;

    let found = get(&app, "/api/v1/airports/sin").await;
    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(body_json(found).await["name"], "Changi");

    let missing = get(&app, "/api/v1/airports/ZZZ").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let invalid = get(&app, "/api/v1/airports/TOOLONG").await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(invalid).await["error"], "Invalid IATA");
}

// ---------------------------------------------------------------------------
// Test: search and IATA prefix search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_endpoints(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;

    let by_city = body_json(get(&app, "/api/v1/airports?q=singa").await).await;
    assert_eq!(by_city.as_array().unwrap().len(), 1);

    let prefix = body_json(get(&app, "/api/v1/airports/iata?q=S").await).await;
    assert_eq!(prefix[0]["iata"], "SIN");

    let empty_prefix = body_json(get(&app, "/api/v1/airports/iata?q=").await).await;
    assert!(empty_prefix.as_array().unwrap().is_empty());

    let garbage_take = get(&app, "/api/v1/airports?q=sin&take=lots").await;
    assert_eq!(garbage_take.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Test: PATCH audits changed fields only
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_audits_changed_fields(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;

    let response = patch_json(
        &app,
        "/api/v1/airports/SIN",
        &json!({
            "name": "Singapore Changi",
            "city": "Singapore",
            "lat": "1.3644",
            "iata": "XXX",
            "reason": "official name",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["updated"]["iata"], "SIN");
    assert_eq!(json["updated"]["name"], "Singapore Changi");
    let changes = json["changes"].as_array().unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["field"], "name");
    assert_eq!(changes[0]["old_value"], "Changi");
    assert_eq!(changes[0]["reason"], "official name");

    let snapshots = body_json(get_admin(&app, "/api/v1/airports/SIN/snapshots").await).await;
    assert_eq!(snapshots.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_reason_from_query(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;

    let response = patch_json(
        &app,
        "/api/v1/airports/SIN?reason=from%20query",
        &json!({"country": "Singapore"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["changes"][0]["reason"], "from query");
}

// ---------------------------------------------------------------------------
// Test: rejected PATCH requests write nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_rejections_write_nothing(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;

    let no_reason = patch_json(&app, "/api/v1/airports/SIN", &json!({"name": "X"})).await;
    assert_eq!(no_reason.status(), StatusCode::BAD_REQUEST);

    let no_fields =
        patch_json(&app, "/api/v1/airports/SIN", &json!({"iata": "X", "reason": "r"})).await;
    assert_eq!(no_fields.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(no_fields).await["error"], "No valid fields to update");

    let bad_lat =
        patch_json(&app, "/api/v1/airports/SIN", &json!({"lat": 95, "reason": "r"})).await;
    assert_eq!(bad_lat.status(), StatusCode::BAD_REQUEST);

    let missing =
        patch_json(&app, "/api/v1/airports/ZZZ", &json!({"name": "X", "reason": "r"})).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let audit = body_json(get_admin(&app, "/api/v1/airports/SIN/audit").await).await;
    assert_eq!(audit.as_array().unwrap().len(), 7);
    let snapshots = body_json(get_admin(&app, "/api/v1/airports/SIN/snapshots").await).await;
    assert_eq!(snapshots.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_patch_requires_admin(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;

    let response = send_json(
        &app,
        "PATCH",
        "/api/v1/airports/SIN",
        None,
        &json!({"name": "X", "reason": "r"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Test: timezone lookup and admin listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_timezone_lookup(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;

    let found = get(&app, "/api/v1/timezone?iata=sin").await;
    assert_eq!(found.status(), StatusCode::OK);
    let json = body_json(found).await;
    assert_eq!(json["iata"], "SIN");
    assert_eq!(json["timezone"], "Asia/Singapore");

    assert_eq!(
        get(&app, "/api/v1/timezone").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        get(&app, "/api/v1/timezone?iata=ZZZ").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_listing(pool: SqlitePool) {
    let app = build_test_app(pool);
    create_changi(&app).await;

    let json = body_json(get_admin(&app, "/api/v1/admin/airports?page=1&take=10").await).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["page"], 1);
    assert_eq!(json["pages"], 1);
    assert_eq!(json["items"][0]["iata"], "SIN");
}

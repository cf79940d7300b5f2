//! Request body helpers for mutating endpoints.
//!
//! Mutations take an optional JSON object body. It carries the field values
//! for create and edit, and may carry the change `reason` for any mutation.

use axum::body::Bytes;
use axum::http::{header, HeaderMap};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Parse the request body as a JSON object.
///
/// Bodies without a JSON content type, and empty bodies, read as an empty
/// object. A JSON body that is not an object is rejected.
pub fn json_object(headers: &HeaderMap, body: &Bytes) -> AppResult<Map<String, Value>> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    if !is_json || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::BadRequest("Request body must be a JSON object".into())),
        Err(e) => Err(AppError::BadRequest(format!("Invalid JSON body: {e}"))),
    }
}

/// The `reason` string from a parsed body, if present.
pub fn body_reason(body: &Map<String, Value>) -> Option<&str> {
    body.get("reason").and_then(Value::as_str)
}

//! Response shaping helpers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Build a structured rejection response: `{"ok": false, "reason": ...}`.
///
/// Machine-readable reason codes let browser clients surface the exact
/// failure instead of a generic network error.
pub fn reject(status: StatusCode, reason: &str) -> Response {
    (status, Json(json!({ "ok": false, "reason": reason }))).into_response()
}

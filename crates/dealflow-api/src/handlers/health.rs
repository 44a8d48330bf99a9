//! Liveness probe.

use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value as JsonValue};

/// # Returns
/// - 200 OK with `{status: "ok", timestamp}`
pub async fn health_check() -> Json<JsonValue> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

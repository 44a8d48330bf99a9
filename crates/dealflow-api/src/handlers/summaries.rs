//! Summary log endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use dealflow_core::Summary;

use super::RecordPath;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkProcessedRequest {
    pub lead_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugLog {
    pub total: usize,
    pub summaries: Vec<Summary>,
    pub last_updated: String,
}

/// Unprocessed summaries, oldest first.
///
/// # Returns
/// - 200 OK with an array of summaries (empty if the log does not exist yet)
pub async fn list_pending(State(state): State<AppState>) -> Result<Json<Vec<Summary>>, ApiError> {
    Ok(Json(state.summaries.list_unprocessed().await?))
}

/// The whole log, processed entries included.
pub async fn debug_log(State(state): State<AppState>) -> Result<Json<DebugLog>, ApiError> {
    let summaries = state.summaries.list_all().await?;
    Ok(Json(DebugLog {
        total: summaries.len(),
        summaries,
        last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// Mark a summary as attached to a lead.
///
/// # Path Parameters
/// - `id`: Summary id
///
/// # Returns
/// - 200 OK with `{success: true}`
/// - 400 Bad Request if `leadId` is missing
/// - 404 Not Found if no summary has this id
pub async fn mark_processed(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<i64>,
    body: Result<Json<MarkProcessedRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let lead_id = req
        .lead_id
        .ok_or_else(|| ApiError::BadRequest("leadId is required".to_string()))?;

    state.summaries.mark_processed(id, lead_id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

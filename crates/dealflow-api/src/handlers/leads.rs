//! Lead management handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use dealflow_core::{pipeline_stats as compute_stats, Lead, LeadUpdate, NewLead, PipelineStats, Stage};

use super::RecordPath;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct MoveStageRequest {
    pub stage: Stage,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(v)| v)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// # Returns
/// - 200 OK with all leads in stored order
pub async fn list_leads(State(state): State<AppState>) -> Result<Json<Vec<Lead>>, ApiError> {
    Ok(Json(state.leads.list().await?))
}

/// Create a lead.
///
/// # Returns
/// - 201 Created with the stored lead
/// - 400 Bad Request if the name is blank or the value is negative
pub async fn create_lead(
    State(state): State<AppState>,
    body: Result<Json<NewLead>, JsonRejection>,
) -> Result<(StatusCode, Json<Lead>), ApiError> {
    let lead = state.leads.create(json_body(body)?).await?;
    info!(lead_id = lead.id, stage = %lead.stage, "Lead created");
    Ok((StatusCode::CREATED, Json(lead)))
}

/// # Returns
/// - 200 OK with the lead
/// - 404 Not Found if the lead doesn't exist
pub async fn get_lead(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<i64>,
) -> Result<Json<Lead>, ApiError> {
    let lead = state
        .leads
        .get_by_id(id)
        .await?
        .ok_or(dealflow_core::Error::LeadNotFound(id))?;
    Ok(Json(lead))
}

/// Edit a lead's fields. Notes are not editable here.
///
/// # Returns
/// - 200 OK with the updated lead
/// - 400 Bad Request on invalid fields
/// - 404 Not Found if the lead doesn't exist
pub async fn update_lead(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<i64>,
    body: Result<Json<LeadUpdate>, JsonRejection>,
) -> Result<Json<Lead>, ApiError> {
    Ok(Json(state.leads.update(id, json_body(body)?).await?))
}

/// # Returns
/// - 204 No Content
/// - 404 Not Found if the lead doesn't exist
pub async fn delete_lead(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.leads.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move a lead to another pipeline stage.
///
/// # Returns
/// - 200 OK with the updated lead
/// - 400 Bad Request for an unknown stage
/// - 404 Not Found if the lead doesn't exist
pub async fn move_lead_to_stage(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<i64>,
    body: Result<Json<MoveStageRequest>, JsonRejection>,
) -> Result<Json<Lead>, ApiError> {
    let req = json_body(body)?;
    let lead = state.leads.move_to_stage(id, req.stage).await?;
    info!(lead_id = id, stage = %lead.stage, "Lead moved");
    Ok(Json(lead))
}

/// Per-stage counts and value totals.
pub async fn pipeline_stats(
    State(state): State<AppState>,
) -> Result<Json<PipelineStats>, ApiError> {
    let leads = state.leads.list().await?;
    Ok(Json(compute_stats(&leads)))
}

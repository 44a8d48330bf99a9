//! Summary import handlers.

use axum::{
    extract::State,
    Json,
};

use dealflow_core::{summaries_for_lead as matching_summaries, Error, Lead, Summary};
use dealflow_jobs::ImportReport;

use super::RecordPath;
use crate::{ApiError, AppState};

/// Pending summaries that would be attached to this lead.
///
/// # Returns
/// - 200 OK with matching summaries, oldest first
/// - 404 Not Found if the lead doesn't exist
pub async fn summaries_for_lead(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<i64>,
) -> Result<Json<Vec<Summary>>, ApiError> {
    let lead = state
        .leads
        .get_by_id(id)
        .await?
        .ok_or(Error::LeadNotFound(id))?;
    let pending = state.feed.pending().await?;
    let matches = matching_summaries(&lead, &pending)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(matches))
}

/// Append one pending summary to a lead's notes and mark it processed.
///
/// # Returns
/// - 200 OK with the updated lead
/// - 404 Not Found if the lead or the pending summary doesn't exist
pub async fn import_summary(
    State(state): State<AppState>,
    RecordPath((id, summary_id)): RecordPath<(i64, i64)>,
) -> Result<Json<Lead>, ApiError> {
    Ok(Json(state.importer.import_into(summary_id, id).await?))
}

/// Run one import pass now.
///
/// # Returns
/// - 200 OK with the pass report
pub async fn run_import(State(state): State<AppState>) -> Result<Json<ImportReport>, ApiError> {
    Ok(Json(state.importer.run_once().await?))
}

//! Direct imports from the Fathom API.

use axum::{extract::State, Json};

use dealflow_core::{Error, Lead};
use dealflow_jobs::{FathomClient, FathomMeeting};

use super::RecordPath;
use crate::{ApiError, AppState};

fn client(state: &AppState) -> Result<&FathomClient, ApiError> {
    state
        .fathom
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Fathom API key is not configured".to_string()))
}

fn fathom_error(err: Error) -> ApiError {
    if err.is_not_found() {
        return err.into();
    }
    ApiError::internal("Failed to fetch from Fathom")(err)
}

/// Recent meetings in the Fathom account.
///
/// # Returns
/// - 200 OK with up to 20 meetings
/// - 503 Service Unavailable if no API key is configured
pub async fn list_meetings(State(state): State<AppState>) -> Result<Json<Vec<FathomMeeting>>, ApiError> {
    let meetings = client(&state)?.recent_meetings().await.map_err(fathom_error)?;
    Ok(Json(meetings))
}

/// Append a recent meeting's Fathom summary to a lead's notes.
///
/// # Returns
/// - 200 OK with the updated lead
/// - 404 Not Found if the lead or the meeting doesn't exist
/// - 503 Service Unavailable if no API key is configured
pub async fn import_meeting(
    State(state): State<AppState>,
    RecordPath((id, meeting_id)): RecordPath<(i64, String)>,
) -> Result<Json<Lead>, ApiError> {
    let fathom = client(&state)?;
    let lead = state
        .importer
        .import_meeting(fathom, &meeting_id, id)
        .await
        .map_err(fathom_error)?;
    Ok(Json(lead))
}

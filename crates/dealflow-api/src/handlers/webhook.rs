//! Webhook receivers for meeting summaries.

use axum::{body::Bytes, extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, info};

use dealflow_core::{epoch_millis, find_matching_lead, MatchMethod, SummaryPayload};

use crate::{ApiError, AppState};

/// Summary text used by the direct formatter when the payload has none.
const NO_SUMMARY_PROVIDED: &str = "No summary provided";

#[derive(Debug, Serialize)]
pub struct WebhookAccepted {
    pub success: bool,
    pub id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedLead {
    pub lead_id: i64,
    pub lead_name: String,
    pub method: MatchMethod,
}

#[derive(Debug, Serialize)]
pub struct LeadMatching {
    pub email: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    /// The lead the summary would be attached to right now, if any.
    #[serde(rename = "match")]
    pub matched: Option<MatchedLead>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectFormatResponse {
    pub success: bool,
    pub timestamp: String,
    pub formatted_summary: String,
    pub lead_matching: LeadMatching,
}

/// An empty body is an empty payload; anything else must be a JSON object.
fn parse_payload(body: &Bytes) -> Result<SummaryPayload, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SummaryPayload::default());
    }
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;
    if !value.is_object() {
        return Err(ApiError::BadRequest("Payload must be a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| ApiError::BadRequest(format!("Invalid payload: {}", e)))
}

/// Record a summary posted by Zapier.
///
/// # Returns
/// - 200 OK with `{success: true, id}`
/// - 400 Bad Request if the body is not a JSON object
/// - 500 Internal Server Error if the log cannot be written
pub async fn receive_summary(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookAccepted>, ApiError> {
    let payload = parse_payload(&body)?;
    let summary = state
        .summaries
        .append(&payload)
        .await
        .map_err(ApiError::internal("Failed to process webhook"))?;
    info!(summary_id = summary.id, "Webhook summary received");
    Ok(Json(WebhookAccepted {
        success: true,
        id: summary.id,
    }))
}

/// Format a summary as a notes block without storing it.
///
/// # Returns
/// - 200 OK with the formatted block and the lead-matching hints
/// - 400 Bad Request if the body is not a JSON object
pub async fn format_direct(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<DirectFormatResponse>, ApiError> {
    let payload = parse_payload(&body)?;
    let now = Utc::now();
    let mut summary = payload.normalize(epoch_millis(), now);
    if summary.summary.trim().is_empty() {
        summary.summary = NO_SUMMARY_PROVIDED.to_string();
    }

    let leads = state.leads.list().await?;
    let matched = find_matching_lead(&summary, &leads).map(|m| MatchedLead {
        lead_id: m.lead.id,
        lead_name: m.lead.name.clone(),
        method: m.method,
    });
    debug!(matched = matched.is_some(), "Direct summary formatted");

    let (email, name, company) = payload.lead_hints();
    Ok(Json(DirectFormatResponse {
        success: true,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        formatted_summary: state.merger.format_summary(&summary, now),
        lead_matching: LeadMatching {
            email,
            name,
            company,
            matched,
        },
    }))
}

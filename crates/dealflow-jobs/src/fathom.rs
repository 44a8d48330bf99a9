//! Client for the Fathom REST API.
//!
//! Besides the Zapier webhook, a lead's summary can be pulled straight from
//! Fathom: list the account's recent meetings, pick one, fetch its summary.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use dealflow_core::defaults::{
    FATHOM_API_URL, FATHOM_MEETING_LIMIT, FATHOM_TIMEOUT_SECS, UNTITLED_MEETING,
};
use dealflow_core::{Error, Participant, Result, Summary, SummaryPayload};

/// Summary text used when Fathom returns neither a summary nor content.
const NO_SUMMARY_AVAILABLE: &str = "No summary available";

/// A recorded meeting as listed by Fathom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FathomMeeting {
    #[serde(deserialize_with = "meeting_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "start_time")]
    pub start_time: Option<String>,
    /// Meeting length in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl FathomMeeting {
    /// Combine the meeting with its fetched summary into a canonical summary.
    pub fn to_summary(&self, detail: &SummaryPayload, id: i64, fetched_at: DateTime<Utc>) -> Summary {
        let mut summary = detail.normalize(id, fetched_at);
        summary.meeting_title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED_MEETING)
            .to_string();
        summary.meeting_date = self.start_time.clone();
        summary.duration = self.duration;
        if summary.participants.is_empty() {
            summary.participants = self.participants.clone();
        }
        if summary.summary.trim().is_empty() {
            summary.summary = NO_SUMMARY_AVAILABLE.to_string();
        }
        summary
    }
}

/// Fathom ids arrive as strings or numbers.
fn meeting_id<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    match JsonValue::deserialize(d)? {
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("invalid meeting id: {}", other))),
    }
}

#[derive(Deserialize)]
struct MeetingList {
    #[serde(default)]
    meetings: Vec<FathomMeeting>,
}

/// Authenticated Fathom API client.
#[derive(Clone)]
pub struct FathomClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for FathomClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FathomClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl FathomClient {
    /// Client for the public Fathom API.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(FATHOM_API_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let api_key = api_key.into().trim().to_string();
        if base_url.is_empty() {
            return Err(Error::Config("Fathom API URL is empty".to_string()));
        }
        if api_key.is_empty() {
            return Err(Error::Config("Fathom API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(FATHOM_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %base_url, "Initializing Fathom client");
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The account's most recent meetings, newest first as Fathom returns them.
    pub async fn recent_meetings(&self) -> Result<Vec<FathomMeeting>> {
        let url = format!("{}/meetings?limit={}", self.base_url, FATHOM_MEETING_LIMIT);
        let list: MeetingList = self.get_json(&url, None).await?;
        debug!(count = list.meetings.len(), "Fetched Fathom meetings");
        Ok(list.meetings)
    }

    /// A meeting from the recent list.
    pub async fn meeting(&self, meeting_id: &str) -> Result<FathomMeeting> {
        self.recent_meetings()
            .await?
            .into_iter()
            .find(|m| m.id == meeting_id)
            .ok_or_else(|| Error::MeetingNotFound(meeting_id.to_string()))
    }

    /// The generated summary of one meeting.
    pub async fn meeting_summary(&self, meeting_id: &str) -> Result<SummaryPayload> {
        let valid = !meeting_id.is_empty()
            && meeting_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::MeetingNotFound(meeting_id.to_string()));
        }
        let url = format!("{}/meetings/{}/summary", self.base_url, meeting_id);
        self.get_json(&url, Some(meeting_id)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, meeting_id: Option<&str>) -> Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(Error::Config("Fathom rejected the API key".to_string()))
            }
            s => match meeting_id {
                Some(id) if s == StatusCode::NOT_FOUND => Err(Error::MeetingNotFound(id.to_string())),
                _ => Err(Error::Request(format!("GET {} returned {}", url, s))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(FathomClient::new("  "), Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = FathomClient::new("secret-key").unwrap();
        let shown = format!("{:?}", client);
        assert!(!shown.contains("secret-key"));
        assert!(shown.contains("api.fathom.video"));
    }

    #[test]
    fn test_meeting_accepts_numeric_id() {
        let meeting: FathomMeeting =
            serde_json::from_value(json!({ "id": 42, "start_time": "2025-08-06T17:30:00Z" })).unwrap();
        assert_eq!(meeting.id, "42");
        assert_eq!(meeting.start_time.as_deref(), Some("2025-08-06T17:30:00Z"));
    }

    #[test]
    fn test_to_summary_fills_meeting_fields() {
        let meeting = FathomMeeting {
            id: "m_1".into(),
            title: Some("  ".into()),
            start_time: Some("2025-08-06T17:30:00Z".into()),
            duration: Some(1800.0),
            participants: vec![Participant {
                name: Some("Lisa Wang".into()),
                email: None,
            }],
        };
        let detail: SummaryPayload = serde_json::from_value(json!({
            "action_items": ["Send quote"]
        }))
        .unwrap();
        let at = Utc.with_ymd_and_hms(2025, 8, 7, 9, 0, 0).unwrap();

        let summary = meeting.to_summary(&detail, 7, at);
        assert_eq!(summary.meeting_title, "Untitled Meeting");
        assert_eq!(summary.summary, "No summary available");
        assert_eq!(summary.duration, Some(1800.0));
        assert_eq!(summary.meeting_date.as_deref(), Some("2025-08-06T17:30:00Z"));
        assert_eq!(summary.participants.len(), 1);
        assert_eq!(summary.action_items, vec!["Send quote".to_string()]);
    }
}

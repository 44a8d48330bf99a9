//! Normalization of inbound webhook payloads.
//!
//! Zapier forwards whatever shape the upstream step produced: lists may
//! arrive as bare strings, numbers as strings, and any field may be missing.
//! [`SummaryPayload`] accepts all of that and [`SummaryPayload::normalize`]
//! produces the canonical [`Summary`] before anything else sees it.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::defaults::UNTITLED_MEETING;
use crate::models::{Participant, Summary};

/// Raw webhook body as posted by Zapier.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SummaryPayload {
    pub meeting_title: Option<JsonValue>,
    pub summary: Option<JsonValue>,
    pub content: Option<JsonValue>,
    pub action_items: Option<JsonValue>,
    pub key_topics: Option<JsonValue>,
    pub participants: Option<JsonValue>,
    pub duration: Option<JsonValue>,
    pub meeting_date: Option<JsonValue>,
    pub lead_email: Option<JsonValue>,
    pub lead_name: Option<JsonValue>,
    pub lead_company: Option<JsonValue>,
}

impl SummaryPayload {
    /// Build the canonical summary with the given id and ingestion time.
    ///
    /// The result is always unprocessed and unassigned.
    pub fn normalize(&self, id: i64, received_at: DateTime<Utc>) -> Summary {
        let meeting_title = text(self.meeting_title.as_ref())
            .unwrap_or_else(|| UNTITLED_MEETING.to_string());
        let summary = text(self.summary.as_ref())
            .or_else(|| text(self.content.as_ref()))
            .unwrap_or_default();

        Summary {
            id,
            timestamp: received_at,
            meeting_title,
            summary,
            action_items: string_list(self.action_items.as_ref()),
            key_topics: string_list(self.key_topics.as_ref()),
            participants: participants(self.participants.as_ref()),
            duration: number(self.duration.as_ref()),
            meeting_date: text(self.meeting_date.as_ref()),
            lead_email: text(self.lead_email.as_ref()),
            lead_name: text(self.lead_name.as_ref()),
            lead_company: text(self.lead_company.as_ref()),
            processed: false,
            lead_id: None,
        }
    }

    /// The lead-matching hints carried by the payload, trimmed.
    pub fn lead_hints(&self) -> (Option<String>, Option<String>, Option<String>) {
        (
            text(self.lead_email.as_ref()),
            text(self.lead_name.as_ref()),
            text(self.lead_company.as_ref()),
        )
    }
}

/// Scalar as trimmed text; blank and non-scalar values are absent.
pub(crate) fn text(value: Option<&JsonValue>) -> Option<String> {
    let s = match value? {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// List elements as strings, keeping order. A bare scalar is a one-element list.
pub(crate) fn string_list(value: Option<&JsonValue>) -> Vec<String> {
    match value {
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                JsonValue::String(s) => Some(s.clone()),
                JsonValue::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(JsonValue::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        Some(JsonValue::Number(n)) => vec![n.to_string()],
        _ => Vec::new(),
    }
}

pub(crate) fn participants(value: Option<&JsonValue>) -> Vec<Participant> {
    let Some(JsonValue::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            JsonValue::Object(map) => {
                let participant = Participant {
                    name: text(map.get("name")),
                    email: text(map.get("email")),
                };
                (participant.name.is_some() || participant.email.is_some()).then_some(participant)
            }
            JsonValue::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else if s.contains('@') {
                    Some(Participant {
                        name: None,
                        email: Some(s.to_string()),
                    })
                } else {
                    Some(Participant {
                        name: Some(s.to_string()),
                        email: None,
                    })
                }
            }
            _ => None,
        })
        .collect()
}

pub(crate) fn number(value: Option<&JsonValue>) -> Option<f64> {
    let n = match value? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(body: JsonValue) -> Summary {
        let payload: SummaryPayload = serde_json::from_value(body).unwrap();
        payload.normalize(1_723_000_000_000, Utc::now())
    }

    #[test]
    fn test_bare_string_action_items_become_single_element() {
        let summary = normalize(json!({ "action_items": "single item" }));
        assert_eq!(summary.action_items, vec!["single item".to_string()]);
    }

    #[test]
    fn test_bare_string_key_topics_become_single_element() {
        let summary = normalize(json!({ "key_topics": "Pricing" }));
        assert_eq!(summary.key_topics, vec!["Pricing".to_string()]);
    }

    #[test]
    fn test_missing_fields_default() {
        let summary = normalize(json!({}));
        assert_eq!(summary.meeting_title, "Untitled Meeting");
        assert_eq!(summary.summary, "");
        assert!(summary.action_items.is_empty());
        assert!(summary.key_topics.is_empty());
        assert!(summary.participants.is_empty());
        assert!(summary.duration.is_none());
        assert!(summary.lead_email.is_none());
        assert!(!summary.processed);
        assert!(summary.lead_id.is_none());
    }

    #[test]
    fn test_null_lists_default_to_empty() {
        let summary = normalize(json!({ "action_items": null, "participants": "nobody" }));
        assert!(summary.action_items.is_empty());
        assert!(summary.participants.is_empty());
    }

    #[test]
    fn test_content_is_fallback_for_summary() {
        let summary = normalize(json!({ "content": "From content" }));
        assert_eq!(summary.summary, "From content");

        let summary = normalize(json!({ "summary": "Primary", "content": "Secondary" }));
        assert_eq!(summary.summary, "Primary");
    }

    #[test]
    fn test_duration_accepts_numeric_string() {
        assert_eq!(normalize(json!({ "duration": 1800 })).duration, Some(1800.0));
        assert_eq!(normalize(json!({ "duration": "2700" })).duration, Some(2700.0));
        assert_eq!(normalize(json!({ "duration": "about an hour" })).duration, None);
    }

    #[test]
    fn test_participants_objects_and_strings() {
        let summary = normalize(json!({
            "participants": [
                { "name": "Sarah Johnson", "email": "sarah.johnson@techstart.com" },
                "mike@globalcorp.com",
                "Lisa Wang",
                {},
                42
            ]
        }));
        assert_eq!(summary.participants.len(), 3);
        assert_eq!(summary.participants[0].name.as_deref(), Some("Sarah Johnson"));
        assert_eq!(summary.participants[1].email.as_deref(), Some("mike@globalcorp.com"));
        assert_eq!(summary.participants[2].name.as_deref(), Some("Lisa Wang"));
    }

    #[test]
    fn test_blank_lead_hints_are_absent() {
        let summary = normalize(json!({ "lead_email": "  ", "lead_name": " Sarah ", "lead_company": "" }));
        assert!(summary.lead_email.is_none());
        assert_eq!(summary.lead_name.as_deref(), Some("Sarah"));
        assert!(summary.lead_company.is_none());
    }

    #[test]
    fn test_list_keeps_order_and_drops_non_strings() {
        let summary = normalize(json!({ "action_items": ["b", null, "a", 3, { "x": 1 }] }));
        assert_eq!(summary.action_items, vec!["b", "a", "3"]);
    }
}

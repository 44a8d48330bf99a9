//! Data models for leads and meeting summaries.
//!
//! JSON field names are camelCase to stay compatible with the browser
//! client and with logs written by earlier versions of the relay.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// =============================================================================
// PIPELINE STAGE
// =============================================================================

/// Pipeline phase of a lead, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Lead,
    Qualified,
    Proposal,
    Negotiation,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 4] = [
        Stage::Lead,
        Stage::Qualified,
        Stage::Proposal,
        Stage::Negotiation,
    ];

    /// Wire name of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Lead => "lead",
            Stage::Qualified => "qualified",
            Stage::Proposal => "proposal",
            Stage::Negotiation => "negotiation",
        }
    }

}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lead" => Ok(Stage::Lead),
            "qualified" => Ok(Stage::Qualified),
            "proposal" => Ok(Stage::Proposal),
            "negotiation" => Ok(Stage::Negotiation),
            other => Err(Error::InvalidInput(format!("Unknown stage '{}'", other))),
        }
    }
}

// =============================================================================
// LEAD
// =============================================================================

/// A sales prospect tracked through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub stage: Stage,
    /// Free text; merged summaries are only ever appended.
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Company name, or an empty string when none is recorded.
    pub fn company_str(&self) -> &str {
        self.company.as_deref().unwrap_or("")
    }
}

// =============================================================================
// SUMMARY
// =============================================================================

/// A meeting participant as reported by the summary provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A normalized meeting summary held in the summary log.
///
/// `processed` flips to `true` exactly once, when the summary has been
/// attached to a lead; it is never reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    /// Ingestion time in epoch milliseconds; the only identifier.
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    #[serde(deserialize_with = "lenient::string")]
    pub meeting_title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub action_items: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub key_topics: Vec<String>,
    #[serde(deserialize_with = "lenient::participants")]
    pub participants: Vec<Participant>,
    /// Meeting length in seconds.
    #[serde(deserialize_with = "lenient::number")]
    pub duration: Option<f64>,
    #[serde(deserialize_with = "lenient::text")]
    pub meeting_date: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub lead_email: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub lead_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub lead_company: Option<String>,
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<i64>,
}

impl Summary {
    /// Participant emails in order, skipping participants without one.
    pub fn participant_emails(&self) -> impl Iterator<Item = &str> {
        self.participants
            .iter()
            .filter_map(|p| p.email.as_deref())
            .filter(|e| !e.trim().is_empty())
    }
}

/// Summary field deserializers that also accept the shapes older relays
/// stored: bare strings for lists, numeric strings for the duration, and
/// string participants.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value as JsonValue;

    use super::Participant;
    use crate::payload;

    fn raw<'de, D: Deserializer<'de>>(d: D) -> Result<Option<JsonValue>, D::Error> {
        Option::<JsonValue>::deserialize(d)
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match raw(d)? {
            Some(JsonValue::String(s)) => s,
            Some(JsonValue::Number(n)) => n.to_string(),
            _ => String::new(),
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(payload::text(raw(d)?.as_ref()))
    }

    pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(payload::string_list(raw(d)?.as_ref()))
    }

    pub fn participants<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Participant>, D::Error> {
        Ok(payload::participants(raw(d)?.as_ref()))
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(payload::number(raw(d)?.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_roundtrip_names() {
        for stage in Stage::ALL {
            assert_eq!(stage.as_str().parse::<Stage>().unwrap(), stage);
        }
    }

    #[test]
    fn test_stage_parse_is_case_insensitive() {
        assert_eq!(" Proposal ".parse::<Stage>().unwrap(), Stage::Proposal);
        assert_eq!("NEGOTIATION".parse::<Stage>().unwrap(), Stage::Negotiation);
    }

    #[test]
    fn test_stage_parse_rejects_unknown() {
        let err = "closed".parse::<Stage>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_stage_order_follows_pipeline() {
        assert!(Stage::Lead < Stage::Qualified);
        assert!(Stage::Proposal < Stage::Negotiation);
    }

    #[test]
    fn test_lead_deserializes_browser_shape() {
        let json = r#"{
            "id": 1001,
            "name": "Sarah Johnson",
            "email": "sarah.johnson@techstart.com",
            "phone": "+1-555-0123",
            "company": "TechStart Inc",
            "value": 25000,
            "stage": "lead",
            "notes": "Interested in our enterprise package.",
            "createdAt": "2025-08-01T10:00:00.000Z"
        }"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.id, 1001);
        assert_eq!(lead.company_str(), "TechStart Inc");
        assert_eq!(lead.stage, Stage::Lead);
        assert_eq!(lead.value, 25000.0);
    }

    #[test]
    fn test_lead_without_notes_defaults_to_empty() {
        let json = r#"{"id": 1, "name": "A", "email": "a@x.io", "value": 0,
                       "stage": "qualified", "createdAt": "2025-08-01T10:00:00Z"}"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.notes, "");
        assert!(lead.company.is_none());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = Summary {
            id: 42,
            meeting_title: "Kickoff".into(),
            action_items: vec!["Send contract".into()],
            ..Default::default()
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["meetingTitle"], "Kickoff");
        assert_eq!(value["actionItems"][0], "Send contract");
        assert_eq!(value["processed"], false);
        assert!(value.get("leadId").is_none());
    }

    #[test]
    fn test_summary_tolerates_missing_fields() {
        // Older relays omit `summary` when it was undefined.
        let json = r#"{"id": 7, "timestamp": "2025-08-07T12:00:00.000Z",
                       "meetingTitle": "Call", "processed": true, "leadId": 1001}"#;
        let summary: Summary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.summary, "");
        assert!(summary.action_items.is_empty());
        assert_eq!(summary.lead_id, Some(1001));
    }

    #[test]
    fn test_summary_coerces_legacy_shapes() {
        let json = r#"{"id": 8, "timestamp": "2025-08-07T12:00:00.000Z",
                       "meetingTitle": "Call", "summary": null,
                       "actionItems": "single item", "keyTopics": null,
                       "participants": ["mike@globalcorp.com"],
                       "duration": "2700", "leadEmail": "  ", "processed": false}"#;
        let summary: Summary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.summary, "");
        assert_eq!(summary.action_items, vec!["single item".to_string()]);
        assert!(summary.key_topics.is_empty());
        assert_eq!(summary.participants[0].email.as_deref(), Some("mike@globalcorp.com"));
        assert_eq!(summary.duration, Some(2700.0));
        assert!(summary.lead_email.is_none());
    }

    #[test]
    fn test_participant_emails_skips_missing() {
        let summary = Summary {
            participants: vec![
                Participant {
                    name: Some("Host".into()),
                    email: None,
                },
                Participant {
                    name: None,
                    email: Some("guest@example.com".into()),
                },
            ],
            ..Default::default()
        };
        let emails: Vec<&str> = summary.participant_emails().collect();
        assert_eq!(emails, vec!["guest@example.com"]);
    }
}

//! Lead creation, editing and pipeline statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Lead, Stage};

/// Request to create a lead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub stage: Stage,
    #[serde(default)]
    pub notes: String,
}

impl NewLead {
    /// Validate and build the lead record.
    pub fn into_lead(self, id: i64, created_at: DateTime<Utc>) -> Result<Lead> {
        validate_name(&self.name)?;
        validate_value(self.value)?;
        Ok(Lead {
            id,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: non_blank(self.phone),
            company: non_blank(self.company),
            value: self.value,
            stage: self.stage,
            notes: self.notes,
            created_at,
        })
    }
}

/// Partial update of a lead's editable fields.
///
/// Notes are not part of an update; they only grow by merged summaries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<Stage>,
}

impl LeadUpdate {
    /// Apply the update; `id` and `createdAt` are preserved.
    pub fn apply(self, lead: &mut Lead) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(value) = self.value {
            validate_value(value)?;
        }

        if let Some(name) = self.name {
            lead.name = name.trim().to_string();
        }
        if let Some(email) = self.email {
            lead.email = email.trim().to_string();
        }
        if self.phone.is_some() {
            lead.phone = non_blank(self.phone);
        }
        if self.company.is_some() {
            lead.company = non_blank(self.company);
        }
        if let Some(value) = self.value {
            lead.value = value;
        }
        if let Some(stage) = self.stage {
            lead.stage = stage;
        }
        Ok(())
    }
}

/// Count and total value of leads in one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageStats {
    pub stage: Stage,
    pub count: usize,
    pub total_value: f64,
}

/// Per-stage and overall pipeline totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    pub stages: Vec<StageStats>,
    pub total_count: usize,
    pub total_value: f64,
}

/// Aggregate leads per stage, in pipeline order.
pub fn pipeline_stats(leads: &[Lead]) -> PipelineStats {
    let stages: Vec<StageStats> = Stage::ALL
        .iter()
        .map(|&stage| {
            let in_stage = leads.iter().filter(|l| l.stage == stage);
            StageStats {
                stage,
                count: in_stage.clone().count(),
                total_value: in_stage.map(|l| l.value).sum(),
            }
        })
        .collect();

    PipelineStats {
        total_count: stages.iter().map(|s| s.count).sum(),
        total_value: stages.iter().map(|s| s.total_value).sum(),
        stages,
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("Lead name is required".to_string()));
    }
    Ok(())
}

fn validate_value(value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidInput(format!(
            "Lead value must be a non-negative amount, got {}",
            value
        )));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_lead(name: &str, value: f64, stage: Stage) -> NewLead {
        NewLead {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            value,
            stage,
            ..Default::default()
        }
    }

    #[test]
    fn test_into_lead_trims_and_drops_blank_optionals() {
        let req = NewLead {
            name: "  Amanda Foster ".into(),
            email: " amanda@retailplus.com ".into(),
            phone: Some("".into()),
            company: Some(" RetailPlus ".into()),
            value: 35000.0,
            stage: Stage::Proposal,
            notes: String::new(),
        };
        let lead = req.into_lead(1009, Utc::now()).unwrap();
        assert_eq!(lead.name, "Amanda Foster");
        assert_eq!(lead.email, "amanda@retailplus.com");
        assert!(lead.phone.is_none());
        assert_eq!(lead.company.as_deref(), Some("RetailPlus"));
    }

    #[test]
    fn test_into_lead_rejects_negative_value() {
        let err = new_lead("Kevin", -1.0, Stage::Lead)
            .into_lead(1, Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_into_lead_rejects_blank_name() {
        assert!(new_lead("   ", 10.0, Stage::Lead).into_lead(1, Utc::now()).is_err());
    }

    #[test]
    fn test_update_preserves_identity_and_notes() {
        let created = Utc::now();
        let mut lead = new_lead("Mike", 75000.0, Stage::Qualified)
            .into_lead(1002, created)
            .unwrap();
        lead.notes = "Budget approved.".into();

        LeadUpdate {
            stage: Some(Stage::Negotiation),
            value: Some(80000.0),
            company: Some("Global Corp".into()),
            ..Default::default()
        }
        .apply(&mut lead)
        .unwrap();

        assert_eq!(lead.id, 1002);
        assert_eq!(lead.created_at, created);
        assert_eq!(lead.notes, "Budget approved.");
        assert_eq!(lead.stage, Stage::Negotiation);
        assert_eq!(lead.value, 80000.0);
        assert_eq!(lead.company.as_deref(), Some("Global Corp"));
    }

    #[test]
    fn test_invalid_update_leaves_lead_untouched() {
        let mut lead = new_lead("Mike", 1.0, Stage::Lead).into_lead(1, Utc::now()).unwrap();
        let before = lead.clone();
        let result = LeadUpdate {
            name: Some("Michael".into()),
            value: Some(f64::NAN),
            ..Default::default()
        }
        .apply(&mut lead);
        assert!(result.is_err());
        assert_eq!(lead, before);
    }

    #[test]
    fn test_pipeline_stats_per_stage() {
        let now = Utc::now();
        let leads: Vec<Lead> = [
            ("A", 25000.0, Stage::Lead),
            ("B", 200000.0, Stage::Lead),
            ("C", 75000.0, Stage::Qualified),
            ("D", 120000.0, Stage::Negotiation),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (n, v, s))| new_lead(n, v, s).into_lead(i as i64, now).unwrap())
        .collect();

        let stats = pipeline_stats(&leads);
        assert_eq!(stats.stages.len(), 4);
        assert_eq!(stats.stages[0].stage, Stage::Lead);
        assert_eq!(stats.stages[0].count, 2);
        assert_eq!(stats.stages[0].total_value, 225000.0);
        assert_eq!(stats.stages[2].stage, Stage::Proposal);
        assert_eq!(stats.stages[2].count, 0);
        assert_eq!(stats.stages[2].total_value, 0.0);
        assert_eq!(stats.total_count, 4);
        assert_eq!(stats.total_value, 420000.0);
    }
}

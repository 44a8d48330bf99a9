//! Core traits for dealflow abstractions.
//!
//! These traits define the interfaces that concrete stores and clients
//! must satisfy, so the importer and HTTP handlers can run against the
//! flat-file stores in production and in-memory fakes in tests.

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::leads::{LeadUpdate, NewLead};
use crate::models::{Lead, Stage, Summary};
use crate::payload::SummaryPayload;

// =============================================================================
// LEAD REPOSITORY
// =============================================================================

/// Repository for lead records.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// All leads in stored order.
    async fn list(&self) -> Result<Vec<Lead>>;

    /// Fetch a lead by id.
    async fn get_by_id(&self, id: i64) -> Result<Option<Lead>>;

    /// Insert the lead, or replace the stored lead with the same id.
    async fn save(&self, lead: Lead) -> Result<()>;

    /// Delete a lead. Returns `Error::LeadNotFound` if it does not exist.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Validate and store a new lead, assigning it a fresh id.
    async fn create(&self, new: NewLead) -> Result<Lead> {
        let existing = self.list().await?;
        let mut id = crate::epoch_millis();
        while existing.iter().any(|l| l.id == id) {
            id += 1;
        }
        let lead = new.into_lead(id, Utc::now())?;
        self.save(lead.clone()).await?;
        Ok(lead)
    }

    /// Apply a partial update to an existing lead.
    async fn update(&self, id: i64, update: LeadUpdate) -> Result<Lead> {
        let mut lead = self.get_by_id(id).await?.ok_or(Error::LeadNotFound(id))?;
        update.apply(&mut lead)?;
        self.save(lead.clone()).await?;
        Ok(lead)
    }

    /// Move a lead to another pipeline stage.
    async fn move_to_stage(&self, id: i64, stage: Stage) -> Result<Lead> {
        self.update(
            id,
            LeadUpdate {
                stage: Some(stage),
                ..Default::default()
            },
        )
        .await
    }
}

// =============================================================================
// SUMMARY LOG
// =============================================================================

/// Bounded, append-only log of ingested summaries.
#[async_trait]
pub trait SummaryLog: Send + Sync {
    /// Normalize and append a payload, evicting the oldest entries past capacity.
    async fn append(&self, payload: &SummaryPayload) -> Result<Summary>;

    /// Unprocessed summaries, oldest first. A missing log is empty.
    async fn list_unprocessed(&self) -> Result<Vec<Summary>>;

    /// The whole log, including processed entries.
    async fn list_all(&self) -> Result<Vec<Summary>>;

    /// Mark a summary processed and record the lead it was attached to.
    ///
    /// Returns `Error::SummaryNotFound` for an unknown id.
    async fn mark_processed(&self, id: i64, lead_id: i64) -> Result<()>;
}

// =============================================================================
// SUMMARY FEED
// =============================================================================

/// Source of pending summaries that can be acknowledged once attached.
///
/// Delivery is at-least-once: a summary keeps appearing in `pending` until
/// `acknowledge` succeeds for it.
#[async_trait]
pub trait SummaryFeed: Send + Sync {
    /// Summaries waiting to be attached, oldest first.
    async fn pending(&self) -> Result<Vec<Summary>>;

    /// Record that `summary_id` was attached to `lead_id`.
    async fn acknowledge(&self, summary_id: i64, lead_id: i64) -> Result<()>;
}

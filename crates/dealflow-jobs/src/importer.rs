//! Import pass: pending summaries → matched leads' notes.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use dealflow_core::{
    epoch_millis, find_matching_lead, Error, Lead, LeadRepository, MatchMethod, NoteMerger, Result,
    SummaryFeed, SummarySource,
};

use crate::fathom::FathomClient;

/// One summary attached to a lead during a pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub summary_id: i64,
    pub lead_id: i64,
    pub method: MatchMethod,
}

/// Outcome of one import pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Pending summaries seen by the pass.
    pub fetched: usize,
    /// Summaries merged into a lead and acknowledged.
    pub attached: Vec<Attachment>,
    /// Summaries no lead matched; they stay pending.
    pub unmatched: usize,
    /// Summaries whose lead could not be saved; they stay pending.
    pub save_failures: usize,
    /// Summaries merged but not acknowledged; they will be seen again.
    pub ack_failures: usize,
}

/// Runs import passes against a feed and a lead repository.
#[derive(Clone)]
pub struct SummaryImporter {
    feed: Arc<dyn SummaryFeed>,
    leads: Arc<dyn LeadRepository>,
    merger: NoteMerger,
}

impl SummaryImporter {
    pub fn new(feed: Arc<dyn SummaryFeed>, leads: Arc<dyn LeadRepository>) -> Self {
        Self {
            feed,
            leads,
            merger: NoteMerger::default(),
        }
    }

    /// Render dates with a specific merger instead of the host's local offset.
    pub fn with_merger(mut self, merger: NoteMerger) -> Self {
        self.merger = merger;
        self
    }

    /// Attach every matchable pending summary to its lead.
    ///
    /// Fetch and lead-load failures abort the pass. Per-summary failures are
    /// logged and counted; the summary is left for the next pass.
    pub async fn run_once(&self) -> Result<ImportReport> {
        let pending = self.feed.pending().await?;
        let mut report = ImportReport {
            fetched: pending.len(),
            ..Default::default()
        };
        if pending.is_empty() {
            return Ok(report);
        }

        let mut leads = self.leads.list().await?;
        for summary in &pending {
            let Some(found) = find_matching_lead(summary, &leads) else {
                debug!(summary_id = summary.id, "No lead matches summary");
                report.unmatched += 1;
                continue;
            };
            let (index, method) = (found.index, found.method);

            let mut lead = leads[index].clone();
            self.merger.attach(&mut lead, summary, Utc::now());
            if let Err(e) = self.leads.save(lead.clone()).await {
                warn!(summary_id = summary.id, lead_id = lead.id, error = %e, "Failed to save lead, summary stays pending");
                report.save_failures += 1;
                continue;
            }
            let lead_id = lead.id;
            // Later summaries for the same lead append to the updated notes.
            leads[index] = lead;

            if let Err(e) = self.feed.acknowledge(summary.id, lead_id).await {
                warn!(summary_id = summary.id, lead_id, error = %e, "Failed to acknowledge summary");
                report.ack_failures += 1;
                continue;
            }

            info!(summary_id = summary.id, lead_id, match_method = %method, "Summary attached to lead");
            report.attached.push(Attachment {
                summary_id: summary.id,
                lead_id,
                method,
            });
        }

        Ok(report)
    }

    /// Import one pending summary into a chosen lead, regardless of matching.
    pub async fn import_into(&self, summary_id: i64, lead_id: i64) -> Result<Lead> {
        let mut lead = self
            .leads
            .get_by_id(lead_id)
            .await?
            .ok_or(Error::LeadNotFound(lead_id))?;
        let summary = self
            .feed
            .pending()
            .await?
            .into_iter()
            .find(|s| s.id == summary_id)
            .ok_or(Error::SummaryNotFound(summary_id))?;

        self.merger.attach(&mut lead, &summary, Utc::now());
        self.leads.save(lead.clone()).await?;
        self.feed.acknowledge(summary_id, lead_id).await?;

        info!(summary_id, lead_id, "Summary imported manually");
        Ok(lead)
    }

    /// Fetch one of the account's recent Fathom meetings and append its
    /// summary to a chosen lead. Nothing is recorded in the summary log.
    pub async fn import_meeting(
        &self,
        fathom: &FathomClient,
        meeting_id: &str,
        lead_id: i64,
    ) -> Result<Lead> {
        let mut lead = self
            .leads
            .get_by_id(lead_id)
            .await?
            .ok_or(Error::LeadNotFound(lead_id))?;
        let meeting = fathom.meeting(meeting_id).await?;
        let detail = fathom.meeting_summary(&meeting.id).await?;

        let now = Utc::now();
        let summary = meeting.to_summary(&detail, epoch_millis(), now);
        self.merger
            .attach_from(SummarySource::FathomApi, &mut lead, &summary, now);
        self.leads.save(lead.clone()).await?;

        info!(meeting_id, lead_id, "Fathom meeting imported");
        Ok(lead)
    }
}

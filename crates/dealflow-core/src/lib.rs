//! # dealflow-core
//!
//! Core types, traits, and pure logic for the dealflow pipeline tracker.
//!
//! This crate owns the lead and summary models, the normalization step that
//! turns loosely-typed webhook payloads into canonical summaries, the lead
//! matcher, and the note merger. Storage, polling and HTTP live in the
//! sibling crates and depend only on the traits defined here.

pub mod defaults;
pub mod error;
pub mod leads;
pub mod matcher;
pub mod models;
pub mod notes;
pub mod payload;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use leads::{pipeline_stats, LeadUpdate, NewLead, PipelineStats, StageStats};
pub use matcher::{find_matching_lead, lead_matches_summary, summaries_for_lead, LeadMatch, MatchMethod};
pub use models::*;
pub use notes::{merge_into_notes, NoteMerger, SummarySource};
pub use payload::SummaryPayload;
pub use traits::*;

/// Current time as Unix epoch milliseconds.
///
/// Leads and summaries both use this as their identifier.
pub fn epoch_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

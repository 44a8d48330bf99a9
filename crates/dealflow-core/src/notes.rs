//! Rendering summaries into lead notes.
//!
//! A merged summary is a fixed text block appended to the lead's notes.
//! Existing note content is never rewritten: the block is appended after a
//! blank line, or becomes the whole note when the notes are blank.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, Utc};

use crate::models::{Lead, Summary};

/// First line of every merged summary block.
pub const BLOCK_HEADER: &str = "═══ FATHOM SUMMARY (via Zapier) ═══";

/// First line of a block fetched directly from the Fathom API.
pub const API_BLOCK_HEADER: &str = "═══ FATHOM SUMMARY ═══";

/// Last line of every merged summary block.
pub const BLOCK_FOOTER: &str = "═══ END FATHOM SUMMARY ═══";

/// How a summary reached the pipeline; selects the block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummarySource {
    /// Posted to the relay by Zapier.
    #[default]
    Webhook,
    /// Pulled from the Fathom API on request.
    FathomApi,
}

impl SummarySource {
    pub fn header(&self) -> &'static str {
        match self {
            SummarySource::Webhook => BLOCK_HEADER,
            SummarySource::FathomApi => API_BLOCK_HEADER,
        }
    }
}

const DATE_FORMAT: &str = "%-m/%-d/%Y";
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Formats summaries and appends them to lead notes.
///
/// Dates are rendered in a fixed UTC offset when one is configured, and
/// otherwise in the host's local offset at the instant being rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteMerger {
    offset: Option<FixedOffset>,
}

impl NoteMerger {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }

    /// Merger following the host's local time zone, daylight saving included.
    pub fn local() -> Self {
        Self { offset: None }
    }

    /// Merger rendering in UTC.
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    fn offset_at(&self, at: DateTime<Utc>) -> FixedOffset {
        match self.offset {
            Some(offset) => offset,
            None => *at.with_timezone(&Local).offset(),
        }
    }

    /// Render the block for a summary received through the webhook.
    pub fn format_summary(&self, summary: &Summary, imported_at: DateTime<Utc>) -> String {
        self.format_block(SummarySource::Webhook, summary, imported_at)
    }

    /// Render the summary block with the header for `source`.
    pub fn format_block(
        &self,
        source: SummarySource,
        summary: &Summary,
        imported_at: DateTime<Utc>,
    ) -> String {
        let mut out = String::new();
        out.push_str(source.header());
        out.push('\n');
        out.push_str(&format!("Meeting: {}\n", summary.meeting_title));

        if let Some(date) = summary.meeting_date.as_deref() {
            out.push_str(&format!("Date: {}\n", self.localized_date(date)));
        }

        if let Some(seconds) = summary.duration.filter(|d| *d != 0.0) {
            let minutes = (seconds / 60.0).round() as i64;
            out.push_str(&format!("Duration: {} minutes\n", minutes));
        }

        let imported = imported_at.with_timezone(&self.offset_at(imported_at));
        out.push_str(&format!("Imported: {}\n\n", imported.format(TIMESTAMP_FORMAT)));
        out.push_str(&summary.summary);
        out.push('\n');

        push_bullets(&mut out, "ACTION ITEMS:", &summary.action_items);
        push_bullets(&mut out, "KEY TOPICS:", &summary.key_topics);

        out.push_str(BLOCK_FOOTER);
        out
    }

    /// Existing notes with the rendered summary appended.
    pub fn merge(&self, notes: &str, summary: &Summary, imported_at: DateTime<Utc>) -> String {
        merge_into_notes(notes, &self.format_summary(summary, imported_at))
    }

    /// Append the rendered summary to `lead.notes` in place.
    pub fn attach(&self, lead: &mut Lead, summary: &Summary, imported_at: DateTime<Utc>) {
        lead.notes = self.merge(&lead.notes, summary, imported_at);
    }

    /// Like [`attach`](Self::attach), with the header for `source`.
    pub fn attach_from(
        &self,
        source: SummarySource,
        lead: &mut Lead,
        summary: &Summary,
        imported_at: DateTime<Utc>,
    ) {
        let block = self.format_block(source, summary, imported_at);
        lead.notes = merge_into_notes(&lead.notes, &block);
    }

    /// Calendar date for display; unparseable input is shown verbatim.
    fn localized_date(&self, raw: &str) -> String {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            let utc = dt.with_timezone(&Utc);
            return utc
                .with_timezone(&self.offset_at(utc))
                .format(DATE_FORMAT)
                .to_string();
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            // Zone-less timestamps are taken as already local.
            return naive.date().format(DATE_FORMAT).to_string();
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return date.format(DATE_FORMAT).to_string();
        }
        raw.to_string()
    }
}

/// Append `block` to `existing`, separated by a blank line when `existing`
/// has content.
pub fn merge_into_notes(existing: &str, block: &str) -> String {
    if existing.trim().is_empty() {
        block.to_string()
    } else {
        format!("{}\n\n{}", existing, block)
    }
}

fn push_bullets(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push('\n');
    out.push_str(heading);
    out.push('\n');
    for item in items.iter().filter(|i| !i.trim().is_empty()) {
        out.push_str("• ");
        out.push_str(item);
        out.push('\n');
    }
}

//! Summary log backed by a single JSON array.
//!
//! Every operation reads the whole document, mutates it, and writes the
//! whole document back. Mutations are serialized inside one process; two
//! processes sharing the file can still lose each other's updates.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use dealflow_core::defaults::{SUMMARY_LOG_CAPACITY, SUMMARY_LOG_FILE};
use dealflow_core::{Error, Result, Summary, SummaryFeed, SummaryLog, SummaryPayload};

use crate::file_storage::StorageBackend;

/// One element of the stored array.
///
/// Elements that do not parse as a summary are carried through rewrites
/// unchanged and still take up a slot in the log.
#[derive(Debug, Clone)]
enum LogEntry {
    Summary(Summary),
    Unreadable(JsonValue),
}

impl LogEntry {
    fn id(&self) -> Option<i64> {
        match self {
            LogEntry::Summary(s) => Some(s.id),
            LogEntry::Unreadable(value) => value.get("id").and_then(JsonValue::as_i64),
        }
    }

    fn into_summary(self) -> Option<Summary> {
        match self {
            LogEntry::Summary(s) => Some(s),
            LogEntry::Unreadable(_) => None,
        }
    }
}

/// Flat-file summary log.
pub struct JsonSummaryStore {
    backend: Arc<dyn StorageBackend>,
    key: String,
    capacity: usize,
    write_lock: Mutex<()>,
}

impl JsonSummaryStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            key: SUMMARY_LOG_FILE.to_string(),
            capacity: SUMMARY_LOG_CAPACITY,
            write_lock: Mutex::new(()),
        }
    }

    /// Override the retained entry count (at least one entry is kept).
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Read the log. Missing, unreadable, and non-array logs are empty.
    async fn load(&self) -> Vec<LogEntry> {
        let data = match self.backend.read(&self.key).await {
            Ok(Some(data)) => data,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Summary log unreadable, treating as empty");
                return Vec::new();
            }
        };
        let values: Vec<JsonValue> = match serde_json::from_slice(&data) {
            Ok(values) => values,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Summary log unparseable, treating as empty");
                return Vec::new();
            }
        };
        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| match serde_json::from_value(value.clone()) {
                Ok(summary) => LogEntry::Summary(summary),
                Err(e) => {
                    warn!(key = %self.key, index, error = %e, "Skipping unreadable summary entry");
                    LogEntry::Unreadable(value)
                }
            })
            .collect()
    }

    async fn load_summaries(&self) -> Vec<Summary> {
        self.load()
            .await
            .into_iter()
            .filter_map(LogEntry::into_summary)
            .collect()
    }

    async fn persist(&self, log: &[LogEntry]) -> Result<()> {
        let values = log
            .iter()
            .map(|entry| match entry {
                LogEntry::Summary(s) => serde_json::to_value(s),
                LogEntry::Unreadable(value) => Ok(value.clone()),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let data = serde_json::to_vec_pretty(&values)?;
        self.backend.write(&self.key, &data).await
    }
}

/// Ingestion time as id, bumped past any id already in the log.
fn next_id(log: &[LogEntry], now_ms: i64) -> i64 {
    let mut id = now_ms;
    while log.iter().any(|entry| entry.id() == Some(id)) {
        id += 1;
    }
    id
}

/// Drop entries from the front until at most `capacity` remain.
fn evict_oldest<T>(log: &mut Vec<T>, capacity: usize) -> usize {
    let excess = log.len().saturating_sub(capacity);
    log.drain(..excess);
    excess
}

#[async_trait]
impl SummaryLog for JsonSummaryStore {
    async fn append(&self, payload: &SummaryPayload) -> Result<Summary> {
        let _guard = self.write_lock.lock().await;
        let mut log = self.load().await;

        let now = Utc::now();
        let summary = payload.normalize(next_id(&log, now.timestamp_millis()), now);
        log.push(LogEntry::Summary(summary.clone()));

        let evicted = evict_oldest(&mut log, self.capacity);
        if evicted > 0 {
            debug!(evicted, capacity = self.capacity, "Evicted oldest summaries");
        }

        self.persist(&log).await?;
        info!(
            summary_id = summary.id,
            meeting_title = %summary.meeting_title,
            log_len = log.len(),
            "Summary appended"
        );
        Ok(summary)
    }

    async fn list_unprocessed(&self) -> Result<Vec<Summary>> {
        let mut log = self.load_summaries().await;
        log.retain(|s| !s.processed);
        Ok(log)
    }

    async fn list_all(&self) -> Result<Vec<Summary>> {
        Ok(self.load_summaries().await)
    }

    async fn mark_processed(&self, id: i64, lead_id: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut log = self.load().await;

        let summary = log
            .iter_mut()
            .find_map(|entry| match entry {
                LogEntry::Summary(s) if s.id == id => Some(s),
                _ => None,
            })
            .ok_or(Error::SummaryNotFound(id))?;
        if summary.processed && summary.lead_id != Some(lead_id) {
            debug!(summary_id = id, previous = ?summary.lead_id, lead_id, "Reassigning processed summary");
        }
        summary.processed = true;
        summary.lead_id = Some(lead_id);

        self.persist(&log).await?;
        info!(summary_id = id, lead_id, "Summary marked processed");
        Ok(())
    }
}

#[async_trait]
impl SummaryFeed for JsonSummaryStore {
    async fn pending(&self) -> Result<Vec<Summary>> {
        self.list_unprocessed().await
    }

    async fn acknowledge(&self, summary_id: i64, lead_id: i64) -> Result<()> {
        self.mark_processed(summary_id, lead_id).await
    }
}

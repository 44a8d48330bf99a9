//! Centralized default constants for dealflow.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Environment overrides are applied by the config loaders in
//! `dealflow-jobs` and `dealflow-api`.

// =============================================================================
// SUMMARY LOG
// =============================================================================

/// Maximum number of summaries retained in the log (oldest evicted first).
pub const SUMMARY_LOG_CAPACITY: usize = 50;

/// File name of the summary log inside the data directory.
pub const SUMMARY_LOG_FILE: &str = "pending-summaries.json";

/// Title used when a payload arrives without a meeting title.
pub const UNTITLED_MEETING: &str = "Untitled Meeting";

// =============================================================================
// LEADS
// =============================================================================

/// Fixed key under which the lead collection is stored.
pub const LEADS_KEY: &str = "crmLeads.json";

// =============================================================================
// IMPORT WORKER
// =============================================================================

/// Interval between automatic import passes.
pub const IMPORT_POLL_INTERVAL_MS: u64 = 30_000;

/// Capacity of the import worker's event broadcast channel.
pub const IMPORT_EVENT_CAPACITY: usize = 64;

/// Timeout for requests made to a remote relay.
pub const RELAY_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// FATHOM API
// =============================================================================

/// Base URL of the Fathom REST API.
pub const FATHOM_API_URL: &str = "https://api.fathom.video/v1";

/// Number of recent meetings offered for a direct import.
pub const FATHOM_MEETING_LIMIT: usize = 20;

/// Timeout for requests made to the Fathom API.
pub const FATHOM_TIMEOUT_SECS: u64 = 15;

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const SERVER_PORT: u16 = 3001;

/// Default data directory for the flat-file stores.
pub const DATA_DIR: &str = "./data";

/// Maximum accepted request body (webhook payloads are small).
pub const REQUEST_BODY_LIMIT: usize = 1024 * 1024;

//! # dealflow-db
//!
//! Flat-file storage layer for dealflow.
//!
//! This crate provides:
//! - Storage backends (filesystem with atomic writes, in-memory)
//! - The bounded summary log shared by the webhook and the importer
//! - Lead repositories, seeded with the example pipeline on first use
//!
//! ## Example
//!
//! ```rust,ignore
//! use dealflow_db::{Store, StoreOptions, SummaryLog};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::open("./data", StoreOptions::default());
//!     let pending = store.summaries.list_unprocessed().await?;
//!     println!("{} summaries waiting", pending.len());
//!     Ok(())
//! }
//! ```

pub mod file_storage;
pub mod leads;
pub mod summaries;

use std::path::PathBuf;
use std::sync::Arc;

// Re-export core types
pub use dealflow_core::*;

pub use file_storage::{FilesystemBackend, MemoryBackend, StorageBackend};
pub use leads::{example_leads, JsonLeadRepository, MemoryLeadRepository};
pub use summaries::JsonSummaryStore;

/// Options for opening a [`Store`].
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Maximum number of summaries retained in the log.
    pub summary_capacity: usize,
    /// Populate an empty lead store with the example pipeline.
    pub seed_example_leads: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            summary_capacity: defaults::SUMMARY_LOG_CAPACITY,
            seed_example_leads: true,
        }
    }
}

/// Lead repository and summary log sharing one storage backend.
#[derive(Clone)]
pub struct Store {
    /// Lead records.
    pub leads: Arc<JsonLeadRepository>,
    /// Ingested meeting summaries.
    pub summaries: Arc<JsonSummaryStore>,
    data_dir: Option<PathBuf>,
}

impl Store {
    /// Open a store rooted at `data_dir`. Files are created lazily.
    pub fn open(data_dir: impl Into<PathBuf>, options: StoreOptions) -> Self {
        let data_dir = data_dir.into();
        let backend: Arc<dyn StorageBackend> = Arc::new(FilesystemBackend::new(&data_dir));
        let mut store = Self::with_backend(backend, options);
        store.data_dir = Some(data_dir);
        store
    }

    /// A store that keeps everything in memory.
    pub fn in_memory(options: StoreOptions) -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()), options)
    }

    pub fn with_backend(backend: Arc<dyn StorageBackend>, options: StoreOptions) -> Self {
        Self {
            leads: Arc::new(
                JsonLeadRepository::new(backend.clone()).with_seed(options.seed_example_leads),
            ),
            summaries: Arc::new(
                JsonSummaryStore::new(backend).with_capacity(options.summary_capacity),
            ),
            data_dir: None,
        }
    }

    /// Directory backing the store, if it is file-based.
    pub fn data_dir(&self) -> Option<&std::path::Path> {
        self.data_dir.as_deref()
    }

    /// Check the data directory is writable. In-memory stores always pass.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        match &self.data_dir {
            Some(dir) => FilesystemBackend::new(dir).validate().await,
            None => Ok(()),
        }
    }
}

//! # dealflow-jobs
//!
//! Background import of meeting summaries into lead notes.
//!
//! This crate provides:
//! - [`SummaryImporter`]: one fetch → match → merge → save → acknowledge pass
//! - [`ImportWorker`]: a cancellable task running passes on a fixed interval
//! - [`RelayClient`]: a [`SummaryFeed`] backed by a remote relay over HTTP
//! - [`FathomClient`]: direct access to recent meetings in the Fathom API
//!
//! ## Example
//!
//! ```ignore
//! use dealflow_jobs::{ImportConfig, ImportWorker, SummaryImporter};
//!
//! let importer = SummaryImporter::new(store.summaries.clone(), store.leads.clone());
//! let handle = ImportWorker::new(importer, ImportConfig::from_env()).start();
//!
//! let mut events = handle.events();
//! while let Ok(event) = events.recv().await {
//!     println!("Event: {:?}", event);
//! }
//!
//! handle.shutdown().await?;
//! ```

pub mod fathom;
pub mod importer;
pub mod relay;
pub mod worker;

// Re-export core types
pub use dealflow_core::*;

pub use fathom::{FathomClient, FathomMeeting};
pub use importer::{Attachment, ImportReport, SummaryImporter};
pub use relay::RelayClient;
pub use worker::{ImportConfig, ImportEvent, ImportHandle, ImportWorker};

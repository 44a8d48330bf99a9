//! Periodic import worker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::sleep;
use tracing::{error, info, instrument};

use dealflow_core::defaults::{IMPORT_EVENT_CAPACITY, IMPORT_POLL_INTERVAL_MS};
use dealflow_core::{Error, MatchMethod, Result};

use crate::importer::{ImportReport, SummaryImporter};

/// Configuration for the import worker.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Delay between passes in milliseconds.
    pub poll_interval_ms: u64,
    /// Whether to run the worker at all.
    pub enabled: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: IMPORT_POLL_INTERVAL_MS,
            enabled: true,
        }
    }
}

impl ImportConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `IMPORT_WORKER_ENABLED` | `true` | Enable/disable background import |
    /// | `IMPORT_POLL_INTERVAL_MS` | `30000` | Delay between import passes |
    pub fn from_env() -> Self {
        let enabled = std::env::var("IMPORT_WORKER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let poll_interval_ms = std::env::var("IMPORT_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .unwrap_or(IMPORT_POLL_INTERVAL_MS);

        Self {
            poll_interval_ms,
            enabled,
        }
    }

    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Event emitted by the import worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportEvent {
    /// Worker started.
    WorkerStarted,
    /// A summary was merged into a lead and acknowledged.
    SummaryAttached {
        summary_id: i64,
        lead_id: i64,
        method: MatchMethod,
    },
    /// A pass finished.
    PassCompleted { fetched: usize, attached: usize },
    /// A pass could not fetch summaries or load leads.
    PassFailed { error: String },
    /// Worker stopped.
    WorkerStopped,
}

/// Handle for controlling a running import worker.
pub struct ImportHandle {
    shutdown_tx: mpsc::Sender<()>,
    event_rx: broadcast::Receiver<ImportEvent>,
}

impl ImportHandle {
    /// Signal the worker to stop. A pass in progress finishes first.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| Error::Internal("Failed to send shutdown signal".into()))?;
        Ok(())
    }

    /// Get a receiver for worker events.
    pub fn events(&self) -> broadcast::Receiver<ImportEvent> {
        self.event_rx.resubscribe()
    }
}

/// Runs an import pass immediately and then once per interval.
pub struct ImportWorker {
    importer: SummaryImporter,
    config: ImportConfig,
    event_tx: broadcast::Sender<ImportEvent>,
}

impl ImportWorker {
    pub fn new(importer: SummaryImporter, config: ImportConfig) -> Self {
        let (event_tx, _) = broadcast::channel(IMPORT_EVENT_CAPACITY);
        Self {
            importer,
            config,
            event_tx,
        }
    }

    /// Start the worker and return a handle for control.
    pub fn start(self) -> ImportHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let event_rx = self.event_tx.subscribe();

        let worker = Arc::new(self);
        tokio::spawn(async move {
            worker.run(&mut shutdown_rx).await;
        });

        ImportHandle {
            shutdown_tx,
            event_rx,
        }
    }

    #[instrument(skip(self, shutdown_rx))]
    async fn run(&self, shutdown_rx: &mut mpsc::Receiver<()>) {
        if !self.config.enabled {
            info!("Import worker is disabled, not starting");
            return;
        }

        info!(poll_interval_ms = self.config.poll_interval_ms, "Import worker started");
        let _ = self.event_tx.send(ImportEvent::WorkerStarted);

        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        loop {
            if shutdown_rx.try_recv().is_ok() {
                info!("Import worker received shutdown signal");
                break;
            }

            match self.importer.run_once().await {
                Ok(report) => self.publish(&report),
                Err(e) => {
                    error!(error = %e, "Import pass failed");
                    let _ = self.event_tx.send(ImportEvent::PassFailed {
                        error: e.to_string(),
                    });
                }
            }

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Import worker received shutdown signal");
                    break;
                }
                _ = sleep(poll_interval) => {}
            }
        }

        let _ = self.event_tx.send(ImportEvent::WorkerStopped);
        info!("Import worker stopped");
    }

    fn publish(&self, report: &ImportReport) {
        for a in &report.attached {
            let _ = self.event_tx.send(ImportEvent::SummaryAttached {
                summary_id: a.summary_id,
                lead_id: a.lead_id,
                method: a.method,
            });
        }
        if report.fetched > 0 {
            info!(
                fetched = report.fetched,
                attached = report.attached.len(),
                unmatched = report.unmatched,
                "Import pass completed"
            );
        }
        let _ = self.event_tx.send(ImportEvent::PassCompleted {
            fetched: report.fetched,
            attached: report.attached.len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = ImportConfig::default()
            .with_poll_interval(250)
            .with_enabled(false);
        assert_eq!(config.poll_interval_ms, 250);
        assert!(!config.enabled);
    }

    #[test]
    fn test_default_interval_is_thirty_seconds() {
        assert_eq!(ImportConfig::default().poll_interval_ms, 30_000);
    }
}

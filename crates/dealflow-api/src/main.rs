//! dealflow-api server binary.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dealflow_api::{build_router, AppState, ServerConfig};
use dealflow_core::SummaryFeed;
use dealflow_db::Store;
use dealflow_jobs::{FathomClient, ImportConfig, ImportWorker, RelayClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "dealflow_api=debug,...,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "dealflow_api=debug,dealflow_db=info,dealflow_jobs=info,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("dealflow-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ServerConfig::from_env();
    let addr = config.socket_addr()?;

    // Open the flat-file store and make sure the data directory is usable
    let store = Store::open(&config.data_dir, config.store_options());
    if let Err(e) = store.validate().await {
        anyhow::bail!(
            "Data directory {} is not writable: {}",
            config.data_dir.display(),
            e
        );
    }
    info!(
        data_dir = %config.data_dir.display(),
        summary_capacity = config.summary_capacity,
        "Store opened"
    );

    let state = match &config.relay_url {
        Some(url) => {
            let feed: Arc<dyn SummaryFeed> = Arc::new(RelayClient::new(url.as_str())?);
            info!(relay_url = %url, "Importing summaries from remote relay");
            AppState::new(&store, feed)
        }
        None => AppState::local(&store),
    };
    let state = match &config.fathom_api_key {
        Some(key) => state.with_fathom(FathomClient::with_base_url(
            config.fathom_api_url.as_str(),
            key.as_str(),
        )?),
        None => {
            info!("FATHOM_API_KEY not set; direct Fathom imports disabled");
            state
        }
    };

    // Background import worker
    let import_config = ImportConfig::from_env();
    if !import_config.enabled {
        warn!("Import worker disabled; summaries are only imported on request");
    }
    let import_handle = ImportWorker::new(state.importer.clone(), import_config).start();

    let app = build_router(state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = import_handle.shutdown().await {
        warn!(error = %e, "Import worker already stopped");
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

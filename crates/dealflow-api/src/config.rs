//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use dealflow_core::defaults;
use dealflow_core::{Error, Result};
use dealflow_db::StoreOptions;

/// Configuration for the HTTP server and its store.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `pending-summaries.json` and `crmLeads.json`.
    pub data_dir: PathBuf,
    pub summary_capacity: usize,
    pub seed_example_leads: bool,
    /// Remote relay to import from instead of the local summary log.
    pub relay_url: Option<String>,
    /// Enables direct imports from the Fathom API.
    pub fathom_api_key: Option<String>,
    pub fathom_api_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            data_dir: PathBuf::from(defaults::DATA_DIR),
            summary_capacity: defaults::SUMMARY_LOG_CAPACITY,
            seed_example_leads: true,
            relay_url: None,
            fathom_api_key: None,
            fathom_api_url: defaults::FATHOM_API_URL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `HOST` | `0.0.0.0` | Bind address |
    /// | `PORT` | `3001` | Bind port |
    /// | `DATA_DIR` | `./data` | Directory for the JSON stores |
    /// | `SUMMARY_LOG_CAPACITY` | `50` | Summaries kept in the log |
    /// | `SEED_EXAMPLE_LEADS` | `true` | Seed an empty lead store with the demo pipeline |
    /// | `RELAY_URL` | unset | Import from a remote relay instead of the local log |
    /// | `FATHOM_API_KEY` | unset | Enables the direct Fathom import routes |
    /// | `FATHOM_API_URL` | `https://api.fathom.video/v1` | Fathom API base URL |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| defaults::SERVER_HOST.to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults::SERVER_PORT);
        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(defaults::DATA_DIR));
        let summary_capacity = std::env::var("SUMMARY_LOG_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults::SUMMARY_LOG_CAPACITY)
            .max(1);
        let seed_example_leads = std::env::var("SEED_EXAMPLE_LEADS")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        let relay_url = std::env::var("RELAY_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let fathom_api_key = std::env::var("FATHOM_API_KEY")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let fathom_api_url = std::env::var("FATHOM_API_URL")
            .unwrap_or_else(|_| defaults::FATHOM_API_URL.to_string());

        Self {
            host,
            port,
            data_dir,
            summary_capacity,
            seed_example_leads,
            relay_url,
            fathom_api_key,
            fathom_api_url,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid HOST/PORT {}:{}: {}", self.host, self.port, e)))
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            summary_capacity: self.summary_capacity,
            seed_example_leads: self.seed_example_leads,
        }
    }
}

//! Client for a remote relay's summary endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::{debug, info};

use dealflow_core::defaults::RELAY_TIMEOUT_SECS;
use dealflow_core::{Error, Result, Summary, SummaryFeed};

/// Reads pending summaries from, and acknowledges them to, another relay.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    /// Create a client for the relay at `base_url` (e.g. `http://localhost:3001`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(RELAY_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config("relay URL is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %base_url, "Initializing relay client");
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SummaryFeed for RelayClient {
    async fn pending(&self) -> Result<Vec<Summary>> {
        let url = format!("{}/api/summaries/pending", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Request(format!("GET {} returned {}", url, status)));
        }

        let summaries: Vec<Summary> = response.json().await?;
        debug!(count = summaries.len(), "Fetched pending summaries from relay");
        Ok(summaries)
    }

    async fn acknowledge(&self, summary_id: i64, lead_id: i64) -> Result<()> {
        let url = format!("{}/api/summaries/{}/processed", self.base_url, summary_id);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "leadId": lead_id }))
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(Error::SummaryNotFound(summary_id)),
            s => Err(Error::Request(format!("POST {} returned {}", url, s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = RelayClient::new("http://relay.local:3001/").unwrap();
        assert_eq!(client.base_url(), "http://relay.local:3001");
    }

    #[test]
    fn test_empty_url_rejected() {
        assert!(matches!(RelayClient::new(""), Err(Error::Config(_))));
    }
}

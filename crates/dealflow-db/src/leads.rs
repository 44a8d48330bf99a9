//! Lead repositories.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use dealflow_core::defaults::LEADS_KEY;
use dealflow_core::{Error, Lead, LeadRepository, Result};

use crate::file_storage::StorageBackend;

const SEED_LEADS: &str = include_str!("seed_leads.json");

/// The demo pipeline a fresh installation starts with.
pub fn example_leads() -> Result<Vec<Lead>> {
    Ok(serde_json::from_str(SEED_LEADS)?)
}

/// Leads stored as one JSON array.
///
/// A lead file that exists but cannot be parsed is an error, not an empty
/// collection, and is never overwritten by seeding.
pub struct JsonLeadRepository {
    backend: Arc<dyn StorageBackend>,
    key: String,
    seed_example_leads: bool,
    write_lock: Mutex<()>,
}

impl JsonLeadRepository {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            key: LEADS_KEY.to_string(),
            seed_example_leads: true,
            write_lock: Mutex::new(()),
        }
    }

    /// Whether a missing lead file is populated with the example leads.
    pub fn with_seed(mut self, seed_example_leads: bool) -> Self {
        self.seed_example_leads = seed_example_leads;
        self
    }

    async fn load(&self) -> Result<Vec<Lead>> {
        match self.backend.read(&self.key).await? {
            Some(data) => serde_json::from_slice(&data).map_err(|e| {
                Error::Serialization(format!("lead store {} is corrupt: {}", self.key, e))
            }),
            None if self.seed_example_leads => {
                let leads = example_leads()?;
                self.persist(&leads).await?;
                info!(count = leads.len(), key = %self.key, "Seeded example leads");
                Ok(leads)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn persist(&self, leads: &[Lead]) -> Result<()> {
        let data = serde_json::to_vec_pretty(leads)?;
        self.backend.write(&self.key, &data).await
    }
}

#[async_trait]
impl LeadRepository for JsonLeadRepository {
    async fn list(&self) -> Result<Vec<Lead>> {
        let _guard = self.write_lock.lock().await;
        self.load().await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Lead>> {
        Ok(self.list().await?.into_iter().find(|l| l.id == id))
    }

    async fn save(&self, lead: Lead) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut leads = self.load().await?;
        let id = lead.id;
        match leads.iter_mut().find(|l| l.id == id) {
            Some(existing) => *existing = lead,
            None => leads.push(lead),
        }
        self.persist(&leads).await?;
        debug!(lead_id = id, "Lead saved");
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut leads = self.load().await?;
        let before = leads.len();
        leads.retain(|l| l.id != id);
        if leads.len() == before {
            return Err(Error::LeadNotFound(id));
        }
        self.persist(&leads).await?;
        info!(lead_id = id, "Lead deleted");
        Ok(())
    }
}

/// In-memory lead repository.
#[derive(Default)]
pub struct MemoryLeadRepository {
    leads: RwLock<Vec<Lead>>,
}

impl MemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_leads(leads: Vec<Lead>) -> Self {
        Self {
            leads: RwLock::new(leads),
        }
    }
}

#[async_trait]
impl LeadRepository for MemoryLeadRepository {
    async fn list(&self) -> Result<Vec<Lead>> {
        Ok(self.leads.read().await.clone())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Lead>> {
        Ok(self.leads.read().await.iter().find(|l| l.id == id).cloned())
    }

    async fn save(&self, lead: Lead) -> Result<()> {
        let mut leads = self.leads.write().await;
        match leads.iter_mut().find(|l| l.id == lead.id) {
            Some(existing) => *existing = lead,
            None => leads.push(lead),
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut leads = self.leads.write().await;
        let before = leads.len();
        leads.retain(|l| l.id != id);
        if leads.len() == before {
            return Err(Error::LeadNotFound(id));
        }
        Ok(())
    }
}

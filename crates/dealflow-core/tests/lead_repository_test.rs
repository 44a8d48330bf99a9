//! Provided `LeadRepository` methods over a minimal repository.

use std::sync::Mutex;

use async_trait::async_trait;

use dealflow_core::{Error, Lead, LeadRepository, LeadUpdate, NewLead, Result, Stage};

#[derive(Default)]
struct VecRepository {
    leads: Mutex<Vec<Lead>>,
}

#[async_trait]
impl LeadRepository for VecRepository {
    async fn list(&self) -> Result<Vec<Lead>> {
        Ok(self.leads.lock().unwrap().clone())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Lead>> {
        Ok(self.leads.lock().unwrap().iter().find(|l| l.id == id).cloned())
    }

    async fn save(&self, lead: Lead) -> Result<()> {
        let mut leads = self.leads.lock().unwrap();
        match leads.iter_mut().find(|l| l.id == lead.id) {
            Some(existing) => *existing = lead,
            None => leads.push(lead),
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut leads = self.leads.lock().unwrap();
        let before = leads.len();
        leads.retain(|l| l.id != id);
        if leads.len() == before {
            return Err(Error::LeadNotFound(id));
        }
        Ok(())
    }
}

fn new_lead(name: &str) -> NewLead {
    NewLead {
        name: name.to_string(),
        value: 5000.0,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_assigns_distinct_ids() {
    let repo = VecRepository::default();
    let a = repo.create(new_lead("Ada")).await.unwrap();
    let b = repo.create(new_lead("Grace")).await.unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(a.stage, Stage::Lead);
    assert_eq!(repo.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_rejects_invalid_lead_without_saving() {
    let repo = VecRepository::default();
    let err = repo.create(new_lead("")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(repo.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_and_move_to_stage() {
    let repo = VecRepository::default();
    let lead = repo.create(new_lead("Ada")).await.unwrap();

    let updated = repo
        .update(
            lead.id,
            LeadUpdate {
                company: Some("Analytical Engines".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.company.as_deref(), Some("Analytical Engines"));

    let moved = repo.move_to_stage(lead.id, Stage::Negotiation).await.unwrap();
    assert_eq!(moved.stage, Stage::Negotiation);
    assert_eq!(moved.company.as_deref(), Some("Analytical Engines"));
    assert_eq!(moved.created_at, lead.created_at);

    let err = repo.move_to_stage(-1, Stage::Lead).await.unwrap_err();
    assert!(matches!(err, Error::LeadNotFound(-1)));
}

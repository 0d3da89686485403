use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::contract::model::{BloodRequest, Donor};
use crate::domain::repo::{BloodRequestRepository, DonorRepository, DuplicateContact};

/// Process-local store. Insertion order is registration order.
#[derive(Default)]
pub struct InMemoryRepository {
    donors: RwLock<Vec<Donor>>,
    requests: RwLock<Vec<BloodRequest>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, handy for fixtures.
    pub fn with_donors(donors: Vec<Donor>) -> Self {
        Self {
            donors: RwLock::new(donors),
            requests: RwLock::default(),
        }
    }
}

#[async_trait]
impl DonorRepository for InMemoryRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Donor>> {
        Ok(self.donors.read().iter().find(|d| d.id == id).cloned())
    }

    async fn contact_exists(&self, contact: &str) -> anyhow::Result<bool> {
        Ok(self.donors.read().iter().any(|d| d.contact == contact))
    }

    async fn insert(&self, donor: Donor) -> anyhow::Result<()> {
        let mut donors = self.donors.write();
        if donors.iter().any(|d| d.contact == donor.contact) {
            return Err(DuplicateContact.into());
        }
        if donors.iter().any(|d| d.id == donor.id) {
            anyhow::bail!("duplicate donor {}", donor.id);
        }
        donors.push(donor);
        Ok(())
    }

    async fn list(&self, limit: u32, offset: u32) -> anyhow::Result<Vec<Donor>> {
        Ok(self
            .donors
            .read()
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Donor>> {
        Ok(self.donors.read().clone())
    }

    async fn set_availability(&self, id: Uuid, available: bool) -> anyhow::Result<bool> {
        let mut donors = self.donors.write();
        match donors.iter_mut().find(|d| d.id == id) {
            Some(d) => {
                d.available = available;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn compare_and_update_donation(
        &self,
        previous: &Donor,
        updated: &Donor,
    ) -> anyhow::Result<bool> {
        let mut donors = self.donors.write();
        let Some(stored) = donors.iter_mut().find(|d| d.id == previous.id) else {
            return Ok(false);
        };
        if stored.points != previous.points || stored.last_donation != previous.last_donation {
            return Ok(false);
        }
        stored.points = updated.points;
        stored.last_donation = updated.last_donation;
        Ok(true)
    }
}

#[async_trait]
impl BloodRequestRepository for InMemoryRepository {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<BloodRequest>> {
        Ok(self.requests.read().iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, request: BloodRequest) -> anyhow::Result<()> {
        self.requests.write().push(request);
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<BloodRequest>> {
        let mut out: Vec<_> = self.requests.read().iter().rev().cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::{BloodRequest, Donor};

/// Carried inside the `anyhow::Error` from `DonorRepository::insert` when
/// another donor already holds the contact.
#[derive(Debug, thiserror::Error)]
#[error("contact already stored")]
pub struct DuplicateContact;

/// Port for the domain layer: donor persistence.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait DonorRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Donor>>;
    async fn contact_exists(&self, contact: &str) -> anyhow::Result<bool>;
    /// Insert a fully-formed donor; the service computes id and timestamps.
    /// A taken contact fails with [`DuplicateContact`].
    async fn insert(&self, donor: Donor) -> anyhow::Result<()>;
    /// Donors in registration order.
    async fn list(&self, limit: u32, offset: u32) -> anyhow::Result<Vec<Donor>>;
    /// Whole population in registration order, used for matching.
    async fn list_all(&self) -> anyhow::Result<Vec<Donor>>;
    async fn set_availability(&self, id: Uuid, available: bool) -> anyhow::Result<bool>;
    /// Persist `updated` only if the stored row still carries the
    /// `points`/`last_donation` of `previous`. Returns false when the
    /// snapshot was stale (or the donor is gone).
    async fn compare_and_update_donation(
        &self,
        previous: &Donor,
        updated: &Donor,
    ) -> anyhow::Result<bool>;
}

/// Port for the domain layer: blood request persistence.
#[async_trait]
pub trait BloodRequestRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<BloodRequest>>;
    async fn insert(&self, request: BloodRequest) -> anyhow::Result<()>;
    /// Newest first.
    async fn list(&self) -> anyhow::Result<Vec<BloodRequest>>;
}

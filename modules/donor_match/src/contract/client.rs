use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::{
    error::DonorMatchError,
    model::{BloodRequest, Donor, EligibilityStatus, MatchSet, NewBloodRequest, NewDonor},
};

/// Public API of the donor_match module for in-process consumers
#[async_trait]
pub trait DonorMatchApi: Send + Sync {
    async fn register_donor(&self, new_donor: NewDonor) -> Result<Donor, DonorMatchError>;

    async fn get_donor(&self, id: Uuid) -> Result<Donor, DonorMatchError>;

    async fn eligibility(&self, id: Uuid) -> Result<EligibilityStatus, DonorMatchError>;

    /// Flip the donor's availability flag
    async fn toggle_availability(&self, id: Uuid) -> Result<Donor, DonorMatchError>;

    /// Confirm a donation; `None` means "now"
    async fn record_donation(
        &self,
        id: Uuid,
        donated_at: Option<DateTime<Utc>>,
    ) -> Result<Donor, DonorMatchError>;

    async fn create_request(
        &self,
        new_request: NewBloodRequest,
    ) -> Result<BloodRequest, DonorMatchError>;

    /// Ordered donors for a posted request, same-location first
    async fn find_matches(&self, request_id: Uuid) -> Result<MatchSet, DonorMatchError>;
}

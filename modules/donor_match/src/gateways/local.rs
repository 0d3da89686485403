use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::DonorMatchApi,
    error::DonorMatchError,
    model::{BloodRequest, Donor, EligibilityStatus, MatchSet, NewBloodRequest, NewDonor},
};
use crate::domain::service::Service;

/// In-process implementation of `DonorMatchApi` delegating to the domain service
pub struct DonorMatchLocalClient {
    service: Arc<Service>,
}

impl DonorMatchLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl DonorMatchApi for DonorMatchLocalClient {
    async fn register_donor(&self, new_donor: NewDonor) -> Result<Donor, DonorMatchError> {
        self.service
            .register_donor(new_donor)
            .await
            .map_err(Into::into)
    }

    async fn get_donor(&self, id: Uuid) -> Result<Donor, DonorMatchError> {
        self.service.get_donor(id).await.map_err(Into::into)
    }

    async fn eligibility(&self, id: Uuid) -> Result<EligibilityStatus, DonorMatchError> {
        self.service.eligibility(id).await.map_err(Into::into)
    }

    async fn toggle_availability(&self, id: Uuid) -> Result<Donor, DonorMatchError> {
        self.service.toggle_availability(id).await.map_err(Into::into)
    }

    async fn record_donation(
        &self,
        id: Uuid,
        donated_at: Option<DateTime<Utc>>,
    ) -> Result<Donor, DonorMatchError> {
        self.service
            .record_donation(id, donated_at)
            .await
            .map_err(Into::into)
    }

    async fn create_request(
        &self,
        new_request: NewBloodRequest,
    ) -> Result<BloodRequest, DonorMatchError> {
        self.service
            .create_request(new_request)
            .await
            .map_err(Into::into)
    }

    async fn find_matches(&self, request_id: Uuid) -> Result<MatchSet, DonorMatchError> {
        self.service
            .match_request(request_id)
            .await
            .map_err(Into::into)
    }
}

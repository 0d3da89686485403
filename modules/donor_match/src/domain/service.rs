use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{
    BloodRequest, Donor, EligibilityStatus, MatchSet, NewBloodRequest, NewDonor,
};
use crate::domain::clock::Clock;
use crate::domain::donation::{self, DEFAULT_POINTS_PER_DONATION};
use crate::domain::eligibility;
use crate::domain::error::DomainError;
use crate::domain::matcher;
use crate::domain::repo::{BloodRequestRepository, DonorRepository, DuplicateContact};

/// Domain service: store access around the pure matching rules.
/// Depends only on the repository ports and a clock, not on infra types.
#[derive(Clone)]
pub struct Service {
    donors: Arc<dyn DonorRepository>,
    requests: Arc<dyn BloodRequestRepository>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub points_per_donation: u32,
    pub max_name_length: usize,
    pub max_contact_length: usize,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            points_per_donation: DEFAULT_POINTS_PER_DONATION,
            max_name_length: 100,
            max_contact_length: 15,
            default_page_size: 50,
            max_page_size: 1000,
        }
    }
}

impl Service {
    pub fn new(
        donors: Arc<dyn DonorRepository>,
        requests: Arc<dyn BloodRequestRepository>,
        clock: Arc<dyn Clock>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            donors,
            requests,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // --- donors ---

    #[instrument(
        name = "donor_match.service.register_donor",
        skip(self),
        fields(blood_group = %new_donor.blood_group)
    )]
    pub async fn register_donor(&self, new_donor: NewDonor) -> Result<Donor, DomainError> {
        info!("Registering donor");

        self.validate_new_donor(&new_donor)?;

        let contact = new_donor.contact.trim().to_string();
        if self
            .donors
            .contact_exists(&contact)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::contact_already_exists(contact));
        }

        let donor = Donor {
            id: Uuid::new_v4(),
            name: new_donor.name.trim().to_string(),
            blood_group: new_donor.blood_group,
            location: new_donor.location.trim().to_string(),
            contact,
            available: true,
            last_donation: None,
            points: 0,
            created_at: self.clock.now(),
        };

        // A concurrent registration can still win the unique index
        self.donors.insert(donor.clone()).await.map_err(|e| {
            if e.is::<DuplicateContact>() {
                DomainError::contact_already_exists(donor.contact.clone())
            } else {
                DomainError::database(e.to_string())
            }
        })?;

        info!("Successfully registered donor with id={}", donor.id);
        Ok(donor)
    }

    #[instrument(name = "donor_match.service.get_donor", skip(self), fields(donor_id = %id))]
    pub async fn get_donor(&self, id: Uuid) -> Result<Donor, DomainError> {
        debug!("Getting donor by id");
        self.load_donor(id).await
    }

    #[instrument(name = "donor_match.service.list_donors", skip(self))]
    pub async fn list_donors(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<Donor>, DomainError> {
        let limit = limit
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size);
        let offset = offset.unwrap_or(0);

        let donors = self
            .donors
            .list(limit, offset)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!("Listed {} donors", donors.len());
        Ok(donors)
    }

    #[instrument(name = "donor_match.service.eligibility", skip(self), fields(donor_id = %id))]
    pub async fn eligibility(&self, id: Uuid) -> Result<EligibilityStatus, DomainError> {
        let donor = self.load_donor(id).await?;
        Ok(eligibility::eligibility_status(&donor, self.clock.now()))
    }

    #[instrument(name = "donor_match.service.set_availability", skip(self), fields(donor_id = %id))]
    pub async fn set_availability(&self, id: Uuid, available: bool) -> Result<Donor, DomainError> {
        info!(available, "Setting donor availability");

        let updated = self
            .donors
            .set_availability(id, available)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !updated {
            return Err(DomainError::donor_not_found(id));
        }

        self.load_donor(id).await
    }

    #[instrument(
        name = "donor_match.service.toggle_availability",
        skip(self),
        fields(donor_id = %id)
    )]
    pub async fn toggle_availability(&self, id: Uuid) -> Result<Donor, DomainError> {
        let current = self.load_donor(id).await?;
        self.set_availability(id, !current.available).await
    }

    /// Confirm a donation. `donated_at` defaults to the clock's now.
    ///
    /// The update is a compare-and-set on the donor's previous state, so two
    /// confirmations racing on the same snapshot cannot both award points.
    #[instrument(name = "donor_match.service.record_donation", skip(self), fields(donor_id = %id))]
    pub async fn record_donation(
        &self,
        id: Uuid,
        donated_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<Donor, DomainError> {
        info!("Recording donation");

        let current = self.load_donor(id).await?;
        let donated_at = donated_at.unwrap_or_else(|| self.clock.now());
        let updated =
            donation::record_donation(&current, donated_at, self.config.points_per_donation)?;

        let applied = self
            .donors
            .compare_and_update_donation(&current, &updated)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !applied {
            warn!("Donation update lost the race against a concurrent update");
            return Err(DomainError::concurrent_update(id));
        }

        info!(points = updated.points, "Donation recorded");
        Ok(updated)
    }

    // --- requests ---

    #[instrument(
        name = "donor_match.service.create_request",
        skip(self),
        fields(blood_group = %new_request.blood_group, urgency = %new_request.urgency)
    )]
    pub async fn create_request(
        &self,
        new_request: NewBloodRequest,
    ) -> Result<BloodRequest, DomainError> {
        info!("Creating blood request");

        require_text("location", &new_request.location)?;
        require_text("hospital", &new_request.hospital)?;

        let request = BloodRequest {
            id: Uuid::new_v4(),
            blood_group: new_request.blood_group,
            location: new_request.location.trim().to_string(),
            hospital: new_request.hospital.trim().to_string(),
            urgency: new_request.urgency,
            created_at: self.clock.now(),
        };

        self.requests
            .insert(request.clone())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully created blood request with id={}", request.id);
        Ok(request)
    }

    #[instrument(name = "donor_match.service.get_request", skip(self), fields(request_id = %id))]
    pub async fn get_request(&self, id: Uuid) -> Result<BloodRequest, DomainError> {
        self.load_request(id).await
    }

    /// Emergencies first, newest first within each urgency.
    #[instrument(name = "donor_match.service.list_requests", skip(self))]
    pub async fn list_requests(&self) -> Result<Vec<BloodRequest>, DomainError> {
        let mut requests = self
            .requests
            .list()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        requests.sort_by_key(|r| !r.urgency.is_emergency());
        Ok(requests)
    }

    #[instrument(name = "donor_match.service.match_request", skip(self), fields(request_id = %id))]
    pub async fn match_request(&self, id: Uuid) -> Result<MatchSet, DomainError> {
        debug!("Matching donors for request");

        let request = self.load_request(id).await?;
        let population = self
            .donors
            .list_all()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let donors = matcher::rank_matches(&request, &population, self.clock.now())?;
        info!(
            candidates = population.len(),
            matches = donors.len(),
            emergency = request.urgency.is_emergency(),
            "Matched donors"
        );

        Ok(MatchSet { request, donors })
    }

    // --- helpers ---

    async fn load_donor(&self, id: Uuid) -> Result<Donor, DomainError> {
        self.donors
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::donor_not_found(id))
    }

    async fn load_request(&self, id: Uuid) -> Result<BloodRequest, DomainError> {
        self.requests
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::request_not_found(id))
    }

    fn validate_new_donor(&self, new_donor: &NewDonor) -> Result<(), DomainError> {
        require_text("name", &new_donor.name)?;
        require_text("location", &new_donor.location)?;
        require_text("contact", &new_donor.contact)?;
        max_len("name", &new_donor.name, self.config.max_name_length)?;
        max_len("contact", &new_donor.contact, self.config.max_contact_length)?;
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid_input(field, "cannot be empty"));
    }
    Ok(())
}

fn max_len(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.trim().chars().count();
    if len > max {
        return Err(DomainError::invalid_input(
            field,
            format!("too long: {len} characters (max: {max})"),
        ));
    }
    Ok(())
}

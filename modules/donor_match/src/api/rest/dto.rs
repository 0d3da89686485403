use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::contract::model::{
    BloodRequest, Donor, EligibilityStatus, MatchSet, MatchedDonor, NewBloodRequest, NewDonor,
    Urgency,
};
use crate::domain::error::DomainError;

/// REST DTO for donor representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DonorDto {
    pub id: Uuid,
    pub name: String,
    /// Canonical group, e.g. "O-"
    pub blood_group: String,
    pub location: String,
    pub contact: String,
    pub available: bool,
    pub last_donation: Option<DateTime<Utc>>,
    pub points: u32,
    pub created_at: DateTime<Utc>,
}

/// REST DTO for registering a donor
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterDonorReq {
    pub name: String,
    pub blood_group: String,
    pub location: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DonorListDto {
    pub donors: Vec<DonorDto>,
    /// Number of donors on this page
    pub count: usize,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListDonorsQuery {
    /// Maximum number of donors to return
    pub limit: Option<u32>,
    /// Number of donors to skip
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetAvailabilityReq {
    pub available: bool,
}

/// Donation confirmation; an absent `donated_at` means "now"
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RecordDonationReq {
    #[serde(default)]
    pub donated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EligibilityDto {
    pub donor_id: Uuid,
    /// One of "eligible", "cooling_down", "unavailable"
    pub status: String,
    pub eligible: bool,
    /// Set while cooling down
    pub eligible_from: Option<DateTime<Utc>>,
}

/// REST DTO for posting a blood request.
///
/// Urgency may be given as `urgency` ("normal" / "emergency") or as the
/// boolean `emergency` flag; if both are present they must agree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateRequestReq {
    pub blood_group: String,
    pub location: String,
    pub hospital: String,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub emergency: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BloodRequestDto {
    pub id: Uuid,
    pub blood_group: String,
    pub location: String,
    pub hospital: String,
    pub urgency: String,
    pub emergency: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BloodRequestListDto {
    pub requests: Vec<BloodRequestDto>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchedDonorDto {
    pub id: Uuid,
    pub name: String,
    pub blood_group: String,
    pub location: String,
    pub contact: String,
    pub same_location: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchListDto {
    pub request: BloodRequestDto,
    pub emergency: bool,
    pub donors: Vec<MatchedDonorDto>,
    pub total: usize,
}

// Conversions between REST DTOs and contract models

impl From<Donor> for DonorDto {
    fn from(d: Donor) -> Self {
        Self {
            id: d.id,
            name: d.name,
            blood_group: d.blood_group.to_string(),
            location: d.location,
            contact: d.contact,
            available: d.available,
            last_donation: d.last_donation,
            points: d.points,
            created_at: d.created_at,
        }
    }
}

impl TryFrom<RegisterDonorReq> for NewDonor {
    type Error = DomainError;

    fn try_from(req: RegisterDonorReq) -> Result<Self, Self::Error> {
        Ok(Self {
            blood_group: req.blood_group.parse()?,
            name: req.name,
            location: req.location,
            contact: req.contact,
        })
    }
}

impl From<BloodRequest> for BloodRequestDto {
    fn from(r: BloodRequest) -> Self {
        Self {
            id: r.id,
            blood_group: r.blood_group.to_string(),
            location: r.location,
            hospital: r.hospital,
            urgency: r.urgency.to_string(),
            emergency: r.urgency.is_emergency(),
            created_at: r.created_at,
        }
    }
}

impl TryFrom<CreateRequestReq> for NewBloodRequest {
    type Error = DomainError;

    fn try_from(req: CreateRequestReq) -> Result<Self, Self::Error> {
        let from_flag = req.emergency.map(|e| {
            if e {
                Urgency::Emergency
            } else {
                Urgency::Normal
            }
        });
        let urgency = match (req.urgency.as_deref().map(str::parse::<Urgency>), from_flag) {
            (Some(parsed), flag) => {
                let parsed = parsed?;
                if flag.is_some_and(|f| f != parsed) {
                    return Err(DomainError::invalid_input(
                        "urgency",
                        "urgency and emergency flag disagree",
                    ));
                }
                parsed
            }
            (None, Some(flag)) => flag,
            (None, None) => Urgency::Normal,
        };

        Ok(Self {
            blood_group: req.blood_group.parse()?,
            location: req.location,
            hospital: req.hospital,
            urgency,
        })
    }
}

impl From<EligibilityStatus> for EligibilityDto {
    fn from(status: EligibilityStatus) -> Self {
        let (label, eligible_from) = match status {
            EligibilityStatus::Eligible => ("eligible", None),
            EligibilityStatus::CoolingDown { eligible_from } => {
                ("cooling_down", Some(eligible_from))
            }
            EligibilityStatus::Unavailable => ("unavailable", None),
        };
        Self {
            donor_id: Uuid::nil(),
            status: label.to_string(),
            eligible: status.is_eligible(),
            eligible_from,
        }
    }
}

impl EligibilityDto {
    pub fn for_donor(donor_id: Uuid, status: EligibilityStatus) -> Self {
        Self {
            donor_id,
            ..Self::from(status)
        }
    }
}

impl From<MatchedDonor> for MatchedDonorDto {
    fn from(m: MatchedDonor) -> Self {
        Self {
            id: m.donor.id,
            name: m.donor.name,
            blood_group: m.donor.blood_group.to_string(),
            location: m.donor.location,
            contact: m.donor.contact,
            same_location: m.same_location,
        }
    }
}

impl From<MatchSet> for MatchListDto {
    fn from(set: MatchSet) -> Self {
        let donors: Vec<MatchedDonorDto> = set.donors.into_iter().map(Into::into).collect();
        Self {
            emergency: set.request.urgency.is_emergency(),
            request: set.request.into(),
            total: donors.len(),
            donors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::BloodGroup;

    fn req(urgency: Option<&str>, emergency: Option<bool>) -> CreateRequestReq {
        CreateRequestReq {
            blood_group: "A+".into(),
            location: "Y".into(),
            hospital: "General".into(),
            urgency: urgency.map(str::to_string),
            emergency,
        }
    }

    #[test]
    fn urgency_resolution() {
        let cases = [
            (None, None, Urgency::Normal),
            (None, Some(true), Urgency::Emergency),
            (None, Some(false), Urgency::Normal),
            (Some("emergency"), None, Urgency::Emergency),
            (Some("emergency"), Some(true), Urgency::Emergency),
        ];
        for (urgency, flag, expected) in cases {
            let out = NewBloodRequest::try_from(req(urgency, flag)).unwrap();
            assert_eq!(out.urgency, expected, "{urgency:?} / {flag:?}");
            assert_eq!(out.blood_group, BloodGroup::APos);
        }

        assert!(NewBloodRequest::try_from(req(Some("normal"), Some(true))).is_err());
        assert!(NewBloodRequest::try_from(req(Some("asap"), None)).is_err());
    }

    #[test]
    fn unknown_blood_group_is_invalid_input() {
        let bad = RegisterDonorReq {
            name: "N".into(),
            blood_group: "K+".into(),
            location: "L".into(),
            contact: "c".into(),
        };
        let err = NewDonor::try_from(bad).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { .. }));
    }

    #[test]
    fn eligibility_labels() {
        let at = Utc::now();
        let dto = EligibilityDto::for_donor(Uuid::nil(), EligibilityStatus::CoolingDown { eligible_from: at });
        assert_eq!(dto.status, "cooling_down");
        assert!(!dto.eligible);
        assert_eq!(dto.eligible_from, Some(at));

        let dto = EligibilityDto::from(EligibilityStatus::Eligible);
        assert_eq!(dto.status, "eligible");
        assert!(dto.eligible);
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// The eight ABO/Rh blood groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BloodGroup {
    ONeg,
    OPos,
    ANeg,
    APos,
    BNeg,
    BPos,
    AbNeg,
    AbPos,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::ONeg,
        BloodGroup::OPos,
        BloodGroup::ANeg,
        BloodGroup::APos,
        BloodGroup::BNeg,
        BloodGroup::BPos,
        BloodGroup::AbNeg,
        BloodGroup::AbPos,
    ];

    /// Canonical text form, e.g. `AB-`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::ONeg => "O-",
            BloodGroup::OPos => "O+",
            BloodGroup::ANeg => "A-",
            BloodGroup::APos => "A+",
            BloodGroup::BNeg => "B-",
            BloodGroup::BPos => "B+",
            BloodGroup::AbNeg => "AB-",
            BloodGroup::AbPos => "AB+",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized blood group '{0}'")]
pub struct UnknownBloodGroup(pub String);

impl FromStr for BloodGroup {
    type Err = UnknownBloodGroup;

    /// Accepts the canonical form case-insensitively, ignoring surrounding
    /// whitespace. Anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        BloodGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| UnknownBloodGroup(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Urgency {
    #[default]
    Normal,
    Emergency,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Emergency => "emergency",
        }
    }

    pub fn is_emergency(&self) -> bool {
        matches!(self, Urgency::Emergency)
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized urgency '{0}'")]
pub struct UnknownUrgency(pub String);

impl FromStr for Urgency {
    type Err = UnknownUrgency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Urgency::Normal),
            "emergency" => Ok(Urgency::Emergency),
            _ => Err(UnknownUrgency(s.to_string())),
        }
    }
}

/// Registered donor (no serde, transport types live in the REST layer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Donor {
    pub id: Uuid,
    pub name: String,
    pub blood_group: BloodGroup,
    pub location: String,
    pub contact: String,
    pub available: bool,
    /// `None` means the donor has never donated.
    pub last_donation: Option<DateTime<Utc>>,
    pub points: u32,
    pub created_at: DateTime<Utc>,
}

/// Data for registering a donor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDonor {
    pub name: String,
    pub blood_group: BloodGroup,
    pub location: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloodRequest {
    pub id: Uuid,
    pub blood_group: BloodGroup,
    pub location: String,
    pub hospital: String,
    pub urgency: Urgency,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBloodRequest {
    pub blood_group: BloodGroup,
    pub location: String,
    pub hospital: String,
    pub urgency: Urgency,
}

/// Derived eligibility state of a donor at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityStatus {
    Eligible,
    CoolingDown { eligible_from: DateTime<Utc> },
    Unavailable,
}

impl EligibilityStatus {
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityStatus::Eligible)
    }
}

/// A donor in a match result with its presentation flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedDonor {
    pub donor: Donor,
    pub same_location: bool,
}

/// Ordered matches for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSet {
    pub request: BloodRequest,
    pub donors: Vec<MatchedDonor>,
}

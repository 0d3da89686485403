use chrono::{DateTime, Duration, Utc};

use crate::contract::model::{Donor, EligibilityStatus};

/// Minimum interval between two donations of the same donor.
pub const COOLDOWN_DAYS: i64 = 90;

pub fn cooldown() -> Duration {
    Duration::days(COOLDOWN_DAYS)
}

/// A donor is eligible when marked available and either has never donated
/// or donated at least [`COOLDOWN_DAYS`] before `now` (the boundary day counts).
pub fn is_eligible(donor: &Donor, now: DateTime<Utc>) -> bool {
    eligibility_status(donor, now).is_eligible()
}

/// Derived state: `Unavailable` overrides the cooldown; otherwise the donor
/// is cooling down until `last_donation + cooldown`.
pub fn eligibility_status(donor: &Donor, now: DateTime<Utc>) -> EligibilityStatus {
    if !donor.available {
        return EligibilityStatus::Unavailable;
    }
    match donor.last_donation {
        None => EligibilityStatus::Eligible,
        Some(last) => {
            let eligible_from = last + cooldown();
            if now >= eligible_from {
                EligibilityStatus::Eligible
            } else {
                EligibilityStatus::CoolingDown { eligible_from }
            }
        }
    }
}

use chrono::{DateTime, Utc};

use crate::contract::model::{BloodRequest, Donor, MatchedDonor};
use crate::domain::compatibility::can_donate;
use crate::domain::eligibility::is_eligible;
use crate::domain::error::DomainError;

/// Localities are free text; compare them trimmed and ASCII case-insensitively.
pub fn same_location(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Compatible, currently eligible donors for `request`, same-location first.
///
/// Input order is kept inside each location group. Urgency does not change
/// the result.
pub fn rank_matches(
    request: &BloodRequest,
    donors: &[Donor],
    now: DateTime<Utc>,
) -> Result<Vec<MatchedDonor>, DomainError> {
    let mut local = Vec::new();
    let mut remote = Vec::new();

    for donor in donors {
        if !can_donate(donor.blood_group, request.blood_group)? || !is_eligible(donor, now) {
            continue;
        }
        let is_local = same_location(&donor.location, &request.location);
        let matched = MatchedDonor {
            donor: donor.clone(),
            same_location: is_local,
        };
        if is_local {
            local.push(matched);
        } else {
            remote.push(matched);
        }
    }

    local.extend(remote);
    Ok(local)
}

pub fn find_matches(
    request: &BloodRequest,
    donors: &[Donor],
    now: DateTime<Utc>,
) -> Result<Vec<Donor>, DomainError> {
    Ok(rank_matches(request, donors, now)?
        .into_iter()
        .map(|m| m.donor)
        .collect())
}

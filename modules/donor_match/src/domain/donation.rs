use chrono::{DateTime, Utc};

use crate::contract::model::Donor;
use crate::domain::error::DomainError;

/// Points granted for each confirmed donation unless configured otherwise.
pub const DEFAULT_POINTS_PER_DONATION: u32 = 10;

/// Apply a confirmed donation: the cooldown restarts at `donation_time` and
/// `award` points are added. Availability is left as it was.
///
/// `donation_time` earlier than the recorded last donation is rejected, as is
/// a point total that would overflow.
///
/// Callers persisting the result must serialize updates per donor; this
/// function only sees the snapshot it is given.
pub fn record_donation(
    donor: &Donor,
    donation_time: DateTime<Utc>,
    award: u32,
) -> Result<Donor, DomainError> {
    if let Some(last) = donor.last_donation {
        if donation_time < last {
            return Err(DomainError::invalid_input(
                "donated_at",
                format!("donation at {donation_time} precedes last recorded donation at {last}"),
            ));
        }
    }

    let points = donor.points.checked_add(award).ok_or_else(|| {
        DomainError::invalid_input("points", format!("point total overflows for donor {}", donor.id))
    })?;

    Ok(Donor {
        last_donation: Some(donation_time),
        points,
        ..donor.clone()
    })
}

use anyhow::Context;
use sea_orm::Set;

use crate::contract::model::{BloodRequest, Donor};
use crate::infra::storage::entity::{blood_request, donor};

/// Stored rows are re-validated on load; a bad row is a storage error.
pub fn donor_from_row(row: donor::Model) -> anyhow::Result<Donor> {
    Ok(Donor {
        blood_group: row
            .blood_group
            .parse()
            .with_context(|| format!("donor {} has a corrupt blood_group", row.id))?,
        points: u32::try_from(row.points)
            .with_context(|| format!("donor {} has out-of-range points {}", row.id, row.points))?,
        id: row.id,
        name: row.name,
        location: row.location,
        contact: row.contact,
        available: row.available,
        last_donation: row.last_donation,
        created_at: row.created_at,
    })
}

pub fn donor_to_active(d: Donor) -> donor::ActiveModel {
    donor::ActiveModel {
        id: Set(d.id),
        name: Set(d.name),
        blood_group: Set(d.blood_group.as_str().to_string()),
        location: Set(d.location),
        contact: Set(d.contact),
        available: Set(d.available),
        last_donation: Set(d.last_donation),
        points: Set(i64::from(d.points)),
        created_at: Set(d.created_at),
    }
}

pub fn request_from_row(row: blood_request::Model) -> anyhow::Result<BloodRequest> {
    Ok(BloodRequest {
        blood_group: row
            .blood_group
            .parse()
            .with_context(|| format!("request {} has a corrupt blood_group", row.id))?,
        urgency: row
            .urgency
            .parse()
            .with_context(|| format!("request {} has a corrupt urgency", row.id))?,
        id: row.id,
        location: row.location,
        hospital: row.hospital,
        created_at: row.created_at,
    })
}

pub fn request_to_active(r: BloodRequest) -> blood_request::ActiveModel {
    blood_request::ActiveModel {
        id: Set(r.id),
        blood_group: Set(r.blood_group.as_str().to_string()),
        location: Set(r.location),
        hospital: Set(r.hospital),
        urgency: Set(r.urgency.as_str().to_string()),
        created_at: Set(r.created_at),
    }
}

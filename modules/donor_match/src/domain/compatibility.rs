//! Donor → recipient blood group compatibility.
//!
//! The table is plain data: each donor group maps to the full set of
//! recipient groups it may serve. Lookups never fall back to a default.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;

use crate::contract::model::BloodGroup::{self, *};
use crate::domain::error::DomainError;

const RULES: [(BloodGroup, &[BloodGroup]); 8] = [
    (ONeg, &[ONeg, OPos, ANeg, APos, BNeg, BPos, AbNeg, AbPos]),
    (OPos, &[OPos, APos, BPos, AbPos]),
    (ANeg, &[ANeg, APos, AbNeg, AbPos]),
    (APos, &[APos, AbPos]),
    (BNeg, &[BNeg, BPos, AbNeg, AbPos]),
    (BPos, &[BPos, AbPos]),
    (AbNeg, &[AbNeg, AbPos]),
    (AbPos, &[AbPos]),
];

static TABLE: Lazy<HashMap<BloodGroup, BTreeSet<BloodGroup>>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|(donor, recipients)| (*donor, recipients.iter().copied().collect()))
        .collect()
});

/// Recipient groups a donor group may serve.
pub fn recipients_of(donor: BloodGroup) -> Result<&'static BTreeSet<BloodGroup>, DomainError> {
    TABLE.get(&donor).ok_or_else(|| {
        DomainError::invalid_input(
            "blood_group",
            format!("no compatibility rule for donor group {donor}"),
        )
    })
}

pub fn can_donate(donor: BloodGroup, recipient: BloodGroup) -> Result<bool, DomainError> {
    Ok(recipients_of(donor)?.contains(&recipient))
}

/// Text entry point; unrecognized groups are `InvalidInput`.
pub fn can_donate_str(donor: &str, recipient: &str) -> Result<bool, DomainError> {
    can_donate(donor.parse()?, recipient.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Rows are donors, columns recipients, both in BloodGroup::ALL order:
    // O-, O+, A-, A+, B-, B+, AB-, AB+
    const EXPECTED: [[bool; 8]; 8] = [
        [true, true, true, true, true, true, true, true],
        [false, true, false, true, false, true, false, true],
        [false, false, true, true, false, false, true, true],
        [false, false, false, true, false, false, false, true],
        [false, false, false, false, true, true, true, true],
        [false, false, false, false, false, true, false, true],
        [false, false, false, false, false, false, true, true],
        [false, false, false, false, false, false, false, true],
    ];

    #[test]
    fn table_matches_canonical_matrix() {
        for (i, donor) in BloodGroup::ALL.into_iter().enumerate() {
            for (j, recipient) in BloodGroup::ALL.into_iter().enumerate() {
                assert_eq!(
                    can_donate(donor, recipient).unwrap(),
                    EXPECTED[i][j],
                    "{donor} -> {recipient}"
                );
            }
        }
    }

    #[test]
    fn table_covers_every_donor_group() {
        assert_eq!(TABLE.len(), 8);
        for g in BloodGroup::ALL {
            assert!(recipients_of(g).is_ok());
        }
    }

    #[test]
    fn universal_donor_and_recipient() {
        assert_eq!(recipients_of(ONeg).unwrap().len(), 8);
        for donor in BloodGroup::ALL {
            assert!(can_donate(donor, AbPos).unwrap());
        }
        // AB+ only serves itself
        let ab_pos: Vec<_> = recipients_of(AbPos).unwrap().iter().copied().collect();
        assert_eq!(ab_pos, vec![AbPos]);
    }

    #[test]
    fn text_lookup_rejects_unknown_groups() {
        assert!(can_donate_str("O-", "A+").unwrap());
        assert!(!can_donate_str("A+", "O-").unwrap());

        let err = can_donate_str("Z+", "A+").unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { ref field, .. } if field == "blood_group"));
        assert!(can_donate_str("A+", "").is_err());
    }
}

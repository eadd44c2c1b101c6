use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use depot_core::{DomainError, Entity, VehicleId};

use crate::required;

/// Canonical plate form: upper-case, single spaces (`34 abc  12` -> `34 ABC 12`).
pub fn normalize_plate(plate: &str) -> String {
    plate
        .split_whitespace()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Vehicle fields as supplied on create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDraft {
    pub name: String,
    pub plate: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Catalog entry: a vehicle that can carry a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    pub plate: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn create(id: VehicleId, draft: &VehicleDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let name = required("name", &draft.name)?;
        let plate = normalize_plate(&required("plate", &draft.plate)?);
        Ok(Self {
            id,
            name,
            plate,
            active: draft.active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update(&self, draft: &VehicleDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let mut next = Self::create(self.id, draft, now)?;
        next.created_at = self.created_at;
        Ok(next)
    }
}

impl Entity for Vehicle {
    const KIND: &'static str = "vehicle";
    type Id = VehicleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plate_is_normalized_on_create() {
        let v = Vehicle::create(
            VehicleId::new(),
            &VehicleDraft {
                name: "Kamyonet".into(),
                plate: " 34  abc 123 ".into(),
                active: true,
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(v.plate, "34 ABC 123");
    }

    #[test]
    fn blank_plate_is_rejected() {
        let err = Vehicle::create(
            VehicleId::new(),
            &VehicleDraft {
                name: "Van".into(),
                plate: "   ".into(),
                active: true,
            },
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::Validation("plate cannot be empty".into()));
    }

    proptest! {
        /// Property: normalization is idempotent.
        #[test]
        fn normalize_plate_is_idempotent(plate in "[a-zA-Z0-9 ]{0,16}") {
            let once = normalize_plate(&plate);
            prop_assert_eq!(normalize_plate(&once), once);
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use depot_core::{DomainError, DriverId, Entity};

use crate::required;

/// Driver fields as supplied on create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverDraft {
    pub first_name: String,
    pub last_name: String,
    /// National identity number, kept as an opaque string.
    pub national_id: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl DriverDraft {
    fn normalized(&self) -> Result<Self, DomainError> {
        Ok(Self {
            first_name: required("first_name", &self.first_name)?,
            last_name: required("last_name", &self.last_name)?,
            national_id: required("national_id", &self.national_id)?,
            phone: self
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            active: self.active,
        })
    }
}

/// Catalog entry: a driver who can be assigned to a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    pub fn create(id: DriverId, draft: &DriverDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let d = draft.normalized()?;
        Ok(Self {
            id,
            first_name: d.first_name,
            last_name: d.last_name,
            national_id: d.national_id,
            phone: d.phone,
            active: d.active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace all editable fields; `created_at` is preserved.
    pub fn update(&self, draft: &DriverDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let mut next = Self::create(self.id, draft, now)?;
        next.created_at = self.created_at;
        Ok(next)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Entity for Driver {
    const KIND: &'static str = "driver";
    type Id = DriverId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

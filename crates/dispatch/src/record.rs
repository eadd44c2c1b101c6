use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use depot_core::{DomainError, DriverId, PickerId, VehicleId};

use crate::{Driver, Vehicle};

/// Delivery note reference: series + per-series number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryNoteRef {
    pub series: String,
    pub number: u64,
}

impl core::fmt::Display for DeliveryNoteRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}", self.series, self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverSnapshot {
    pub driver_id: DriverId,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub vehicle_id: VehicleId,
    pub name: String,
    pub plate: String,
}

/// Immutable record of a dispatch, created once per order.
///
/// Driver and vehicle are copied by value: later catalog edits or deletes do
/// not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub delivery_note: DeliveryNoteRef,
    pub driver: DriverSnapshot,
    pub vehicle: VehicleSnapshot,
    pub dispatched_by: Option<PickerId>,
    pub dispatched_at: DateTime<Utc>,
}

impl DispatchRecord {
    /// Build a record from live catalog entries, rejecting inactive ones.
    pub fn compose(
        delivery_note: DeliveryNoteRef,
        driver: &Driver,
        vehicle: &Vehicle,
        dispatched_by: Option<PickerId>,
        dispatched_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if delivery_note.series.trim().is_empty() {
            return Err(DomainError::validation("delivery_series cannot be empty"));
        }
        if !driver.active {
            return Err(DomainError::validation(format!(
                "driver {} is inactive",
                driver.id
            )));
        }
        if !vehicle.active {
            return Err(DomainError::validation(format!(
                "vehicle {} ({}) is inactive",
                vehicle.id, vehicle.plate
            )));
        }

        Ok(Self {
            delivery_note,
            driver: DriverSnapshot {
                driver_id: driver.id,
                first_name: driver.first_name.clone(),
                last_name: driver.last_name.clone(),
                national_id: driver.national_id.clone(),
            },
            vehicle: VehicleSnapshot {
                vehicle_id: vehicle.id,
                name: vehicle.name.clone(),
                plate: vehicle.plate.clone(),
            },
            dispatched_by,
            dispatched_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DriverDraft, VehicleDraft};

    fn driver(active: bool) -> Driver {
        Driver::create(
            DriverId::new(),
            &DriverDraft {
                first_name: "Ali".into(),
                last_name: "Demir".into(),
                national_id: "10000000146".into(),
                phone: None,
                active,
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn vehicle(active: bool) -> Vehicle {
        Vehicle::create(
            VehicleId::new(),
            &VehicleDraft {
                name: "Truck 1".into(),
                plate: "06 XYZ 42".into(),
                active,
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn note() -> DeliveryNoteRef {
        DeliveryNoteRef {
            series: "IRS".into(),
            number: 1,
        }
    }

    #[test]
    fn compose_snapshots_catalog_entries() {
        let d = driver(true);
        let v = vehicle(true);
        let record = DispatchRecord::compose(note(), &d, &v, None, Utc::now()).unwrap();
        assert_eq!(record.driver.national_id, "10000000146");
        assert_eq!(record.vehicle.plate, "06 XYZ 42");
        assert_eq!(record.delivery_note.to_string(), "IRS-1");
    }

    #[test]
    fn inactive_driver_is_rejected() {
        let err = DispatchRecord::compose(note(), &driver(false), &vehicle(true), None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("inactive")));
    }

    #[test]
    fn inactive_vehicle_is_rejected() {
        let err = DispatchRecord::compose(note(), &driver(true), &vehicle(false), None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("06 XYZ 42")));
    }

    #[test]
    fn blank_series_is_rejected() {
        let mut n = note();
        n.series = " ".into();
        let err = DispatchRecord::compose(n, &driver(true), &vehicle(true), None, Utc::now())
            .unwrap_err();
        assert_eq!(err, DomainError::Validation("delivery_series cannot be empty".into()));
    }
}

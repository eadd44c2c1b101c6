use chrono::Utc;
use tracing::info;

use depot_core::{DomainError, DriverId, VehicleId, missing};
use depot_dispatch::{Driver, DriverDraft, Vehicle, VehicleDraft};

use crate::read_model::KeyValueStore;

use super::error::poisoned;
use super::{EngineError, WarehouseEngine};

/// Catalog writes are serialized by `catalog_writes`, so an update can never
/// resurrect an entry a concurrent delete just removed.
impl WarehouseEngine {
    pub fn list_drivers(&self, active_only: bool) -> Vec<Driver> {
        let mut drivers: Vec<Driver> = self
            .drivers
            .list()
            .into_iter()
            .filter(|d| !active_only || d.active)
            .collect();
        drivers.sort_by(|a, b| {
            (a.last_name.as_str(), a.first_name.as_str(), a.id).cmp(&(b.last_name.as_str(), b.first_name.as_str(), b.id))
        });
        drivers
    }

    pub fn get_driver(&self, id: &DriverId) -> Result<Driver, EngineError> {
        self.drivers
            .get(id)
            .ok_or_else(|| missing::<Driver>(id).into())
    }

    pub fn create_driver(&self, draft: &DriverDraft) -> Result<Driver, EngineError> {
        let _guard = self.catalog_writes.lock().map_err(|_| poisoned("catalog"))?;
        let driver = Driver::create(DriverId::new(), draft, Utc::now())?;
        self.drivers.upsert(driver.id, driver.clone());
        info!(driver = %driver.id, name = %driver.full_name(), "driver created");
        Ok(driver)
    }

    pub fn update_driver(&self, id: &DriverId, draft: &DriverDraft) -> Result<Driver, EngineError> {
        let _guard = self.catalog_writes.lock().map_err(|_| poisoned("catalog"))?;
        let updated = self.get_driver(id)?.update(draft, Utc::now())?;
        self.drivers.upsert(updated.id, updated.clone());
        info!(driver = %id, active = updated.active, "driver updated");
        Ok(updated)
    }

    /// Dispatch records keep their own driver snapshot, so deletion is never
    /// blocked by history.
    pub fn delete_driver(&self, id: &DriverId) -> Result<(), EngineError> {
        let _guard = self.catalog_writes.lock().map_err(|_| poisoned("catalog"))?;
        self.drivers
            .remove(id)
            .ok_or_else(|| EngineError::from(missing::<Driver>(id)))?;
        info!(driver = %id, "driver deleted");
        Ok(())
    }

    pub fn list_vehicles(&self, active_only: bool) -> Vec<Vehicle> {
        let mut vehicles: Vec<Vehicle> = self
            .vehicles
            .list()
            .into_iter()
            .filter(|v| !active_only || v.active)
            .collect();
        vehicles.sort_by(|a, b| a.plate.cmp(&b.plate));
        vehicles
    }

    pub fn get_vehicle(&self, id: &VehicleId) -> Result<Vehicle, EngineError> {
        self.vehicles
            .get(id)
            .ok_or_else(|| missing::<Vehicle>(id).into())
    }

    /// Plates are unique across vehicles (after normalisation).
    pub fn create_vehicle(&self, draft: &VehicleDraft) -> Result<Vehicle, EngineError> {
        let _guard = self.catalog_writes.lock().map_err(|_| poisoned("catalog"))?;
        let vehicle = Vehicle::create(VehicleId::new(), draft, Utc::now())?;
        self.ensure_plate_free(&vehicle)?;
        self.vehicles.upsert(vehicle.id, vehicle.clone());
        info!(vehicle = %vehicle.id, plate = %vehicle.plate, "vehicle created");
        Ok(vehicle)
    }

    pub fn update_vehicle(&self, id: &VehicleId, draft: &VehicleDraft) -> Result<Vehicle, EngineError> {
        let _guard = self.catalog_writes.lock().map_err(|_| poisoned("catalog"))?;
        let updated = self.get_vehicle(id)?.update(draft, Utc::now())?;
        self.ensure_plate_free(&updated)?;
        self.vehicles.upsert(updated.id, updated.clone());
        info!(vehicle = %id, plate = %updated.plate, active = updated.active, "vehicle updated");
        Ok(updated)
    }

    pub fn delete_vehicle(&self, id: &VehicleId) -> Result<(), EngineError> {
        let _guard = self.catalog_writes.lock().map_err(|_| poisoned("catalog"))?;
        self.vehicles
            .remove(id)
            .ok_or_else(|| EngineError::from(missing::<Vehicle>(id)))?;
        info!(vehicle = %id, "vehicle deleted");
        Ok(())
    }

    fn ensure_plate_free(&self, vehicle: &Vehicle) -> Result<(), EngineError> {
        match self
            .vehicles
            .list()
            .into_iter()
            .find(|other| other.id != vehicle.id && other.plate == vehicle.plate)
        {
            Some(other) => Err(DomainError::conflict(format!(
                "plate {} is already registered to vehicle {}",
                vehicle.plate, other.id
            ))
            .into()),
            None => Ok(()),
        }
    }
}

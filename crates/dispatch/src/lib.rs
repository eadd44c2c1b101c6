//! Dispatch Catalog: drivers and vehicles, plus the immutable dispatch record
//! written when an order leaves the warehouse.
//!
//! Pure domain logic (no IO, no storage). Catalog entries are plain entities
//! with an active flag; the dispatch record stores a denormalized snapshot so
//! catalog entries can be edited or deleted without touching history.

pub mod driver;
pub mod record;
pub mod vehicle;

pub use driver::{Driver, DriverDraft};
pub use record::{DeliveryNoteRef, DispatchRecord, DriverSnapshot, VehicleSnapshot};
pub use vehicle::{Vehicle, VehicleDraft, normalize_plate};

use depot_core::DomainError;

pub(crate) fn required(field: &str, value: &str) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

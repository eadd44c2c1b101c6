//! `depot-core` — domain foundation building blocks for the warehouse engine.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use entity::{Entity, missing};
pub use error::DomainError;
pub use id::{DriverId, OrderNumber, PickerId, ReportId, VehicleId};

/// Quantities and money are decimal: ERP units include kg, metres and boxes.
pub use rust_decimal::Decimal;

/// Quantity of a product in its primary unit.
pub type Quantity = Decimal;

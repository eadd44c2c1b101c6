//! Records stored by id rather than rebuilt from an event stream.

use crate::error::DomainError;

/// Reference-data records (drivers, vehicles) and ledger entries (image
/// issue reports). Edits replace the stored value wholesale.
pub trait Entity {
    /// Human-readable kind used in error messages (`driver`, `vehicle`).
    const KIND: &'static str;

    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;
}

/// `NotFound` naming the entity kind and id, e.g. `driver 0190...`.
pub fn missing<E: Entity>(id: &E::Id) -> DomainError {
    DomainError::not_found(format!("{} {id}", E::KIND))
}

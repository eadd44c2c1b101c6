use thiserror::Error;

use depot_core::DomainError;
use depot_stock::StockError;

use crate::command_dispatcher::DispatchError;
use crate::event_store::EventStoreError;
use crate::projections::ProjectionError;

/// Error returned by every `WarehouseEngine` operation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] EventStoreError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

impl EngineError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            EngineError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DispatchError> for EngineError {
    fn from(value: DispatchError) -> Self {
        match value {
            DispatchError::Domain(e) => EngineError::Domain(e),
            DispatchError::Concurrency(msg) => EngineError::Domain(DomainError::conflict(msg)),
            DispatchError::Deserialize(msg) => EngineError::Projection(ProjectionError::Deserialize(msg)),
            DispatchError::Store(e) => EngineError::Store(e),
        }
    }
}

impl From<StockError> for EngineError {
    fn from(value: StockError) -> Self {
        EngineError::Domain(value.into())
    }
}

pub(crate) fn poisoned(what: &str) -> EngineError {
    EngineError::Store(EventStoreError::Unavailable(format!("{what} lock poisoned")))
}

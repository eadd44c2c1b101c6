//! Infrastructure layer: event store, command pipeline, projections, config,
//! and the `WarehouseEngine` facade that ties them to the fulfillment domain.

pub mod command_dispatcher;
pub mod config;
pub mod delivery_numbers;
pub mod engine;
pub mod event_store;
pub mod order_locks;
pub mod projections;
pub mod read_model;

pub use config::{AppConfig, ConfigError, EngineSettings, LogConfig, LogFormat};
pub use engine::{EngineError, WarehouseEngine};

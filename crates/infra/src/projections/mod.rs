//! Projections: disposable read models fed from committed events.

pub mod fulfillment_orders;

pub use fulfillment_orders::{FulfillmentOrdersProjection, ProjectionError};

//! Domain events: the `Event` contract and the envelope persisted per stream.

pub mod envelope;
pub mod event;

pub use envelope::{EventEnvelope, Placement};
pub use event::Event;

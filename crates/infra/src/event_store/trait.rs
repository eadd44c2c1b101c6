use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use depot_core::ExpectedVersion;
use std::sync::Arc;

/// A serialized fulfillment event on its way into a stream.
///
/// The aggregate decides typed events, `from_typed` turns each into one of
/// these, and the store hands back a `StoredEvent` with its position filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncommittedEvent {
    pub event_id: Uuid,
    pub stream_id: String,
    pub aggregate_type: String,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,

    pub payload: JsonValue,
}

/// An event as persisted. `sequence_number` counts from 1 within its stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: Uuid,
    pub stream_id: String,
    pub aggregate_type: String,

    pub sequence_number: u64,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,

    pub payload: JsonValue,
}

impl StoredEvent {
    /// Convert a stored event into an envelope for projections.
    pub fn to_envelope(&self) -> depot_events::EventEnvelope<JsonValue> {
        depot_events::EventEnvelope::new(
            self.event_id,
            self.stream_id.clone(),
            self.aggregate_type.clone(),
            self.sequence_number,
            self.payload.clone(),
        )
    }
}

/// Failures raised by a store backend. Domain rejections never appear here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventStoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("aggregate type mismatch: {0}")]
    AggregateTypeMismatch(String),

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("event store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only log of order streams.
///
/// An append carries events for exactly one stream and lands in full or not
/// at all. The store numbers them from the stream's revision + 1 and refuses
/// the batch with `Concurrency` when `expected_version` no longer matches.
/// Loading an unknown stream yields an empty vector.
pub trait EventStore: Send + Sync {
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError>;

    fn load_stream(&self, stream_id: &str) -> Result<Vec<StoredEvent>, EventStoreError>;

    /// All events of one aggregate type, stream by stream, for rebuilds.
    fn load_all(&self, aggregate_type: &str) -> Result<Vec<StoredEvent>, EventStoreError>;
}

impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).append(events, expected_version)
    }

    fn load_stream(&self, stream_id: &str) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).load_stream(stream_id)
    }

    fn load_all(&self, aggregate_type: &str) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).load_all(aggregate_type)
    }
}

impl UncommittedEvent {
    /// Wrap a typed domain event with stream metadata, serializing it to JSON.
    pub fn from_typed<E>(
        stream_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        event_id: Uuid,
        event: &E,
    ) -> Result<Self, EventStoreError>
    where
        E: depot_events::Event + Serialize,
    {
        let stream_id = stream_id.into();
        if event.stream_id() != stream_id {
            return Err(EventStoreError::InvalidAppend(format!(
                "event for stream {} cannot be appended to {stream_id}",
                event.stream_id()
            )));
        }
        let payload = serde_json::to_value(event)
            .map_err(|e| EventStoreError::InvalidAppend(format!("payload serialization failed: {e}")))?;

        Ok(Self {
            event_id,
            stream_id,
            aggregate_type: aggregate_type.into(),
            event_type: event.event_type().to_string(),
            event_version: event.version(),
            occurred_at: event.occurred_at(),
            payload,
        })
    }
}

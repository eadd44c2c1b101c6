use std::collections::BTreeMap;
use std::sync::RwLock;

use depot_core::ExpectedVersion;

use super::r#trait::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

/// Event store held in process memory, one vector per order stream.
///
/// Backs single-process deployments and tests; everything is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: RwLock<BTreeMap<String, Stream>>,
}

#[derive(Debug)]
struct Stream {
    /// Fixed by the first append.
    aggregate_type: String,
    events: Vec<StoredEvent>,
}

impl Stream {
    fn revision(&self) -> u64 {
        self.events.last().map_or(0, |e| e.sequence_number)
    }
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> EventStoreError {
    EventStoreError::Unavailable("event store lock poisoned".to_string())
}

/// The (stream, aggregate type) a batch targets; a batch never spans streams.
fn batch_target(events: &[UncommittedEvent]) -> Result<Option<(String, String)>, EventStoreError> {
    let Some(head) = events.first() else {
        return Ok(None);
    };
    if let Some(pos) = events.iter().position(|e| e.stream_id != head.stream_id) {
        return Err(EventStoreError::InvalidAppend(format!(
            "batch mixes streams {} and {} (event {pos})",
            head.stream_id, events[pos].stream_id
        )));
    }
    if let Some(pos) = events.iter().position(|e| e.aggregate_type != head.aggregate_type) {
        return Err(EventStoreError::AggregateTypeMismatch(format!(
            "batch mixes aggregate types {} and {} (event {pos})",
            head.aggregate_type, events[pos].aggregate_type
        )));
    }
    Ok(Some((head.stream_id.clone(), head.aggregate_type.clone())))
}

impl EventStore for InMemoryEventStore {
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let Some((stream_id, aggregate_type)) = batch_target(&events)? else {
            return Ok(vec![]);
        };

        let mut streams = self.streams.write().map_err(|_| poisoned())?;
        let revision = streams.get(&stream_id).map_or(0, Stream::revision);
        if !expected_version.matches(revision) {
            return Err(EventStoreError::Concurrency(format!(
                "stream {stream_id}: expected {expected_version:?}, at revision {revision}"
            )));
        }

        let stream = streams.entry(stream_id).or_insert_with(|| Stream {
            aggregate_type: aggregate_type.clone(),
            events: Vec::new(),
        });
        if stream.aggregate_type != aggregate_type {
            return Err(EventStoreError::AggregateTypeMismatch(format!(
                "stream holds {} events, refused {aggregate_type}",
                stream.aggregate_type
            )));
        }

        let committed: Vec<StoredEvent> = events
            .into_iter()
            .zip(revision + 1..)
            .map(|(e, sequence_number)| StoredEvent {
                event_id: e.event_id,
                stream_id: e.stream_id,
                aggregate_type: e.aggregate_type,
                sequence_number,
                event_type: e.event_type,
                event_version: e.event_version,
                occurred_at: e.occurred_at,
                payload: e.payload,
            })
            .collect();
        stream.events.extend(committed.iter().cloned());
        Ok(committed)
    }

    fn load_stream(&self, stream_id: &str) -> Result<Vec<StoredEvent>, EventStoreError> {
        let streams = self.streams.read().map_err(|_| poisoned())?;
        Ok(streams.get(stream_id).map(|s| s.events.clone()).unwrap_or_default())
    }

    fn load_all(&self, aggregate_type: &str) -> Result<Vec<StoredEvent>, EventStoreError> {
        let streams = self.streams.read().map_err(|_| poisoned())?;
        Ok(streams
            .values()
            .filter(|s| s.aggregate_type == aggregate_type)
            .flat_map(|s| s.events.iter().cloned())
            .collect())
    }
}

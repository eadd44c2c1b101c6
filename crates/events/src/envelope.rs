use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an envelope lines up against the last position a consumer has seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Already consumed; replays after a retry land here.
    Seen,
    /// Exactly one past the cursor.
    Next,
    /// Skips ahead or carries sequence 0.
    Gap,
}

/// A committed event as projections receive it.
///
/// `stream_id` is the aggregate key as text, an order number for fulfillment
/// streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    stream_id: String,
    aggregate_type: String,
    sequence_number: u64,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        stream_id: impl Into<String>,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            stream_id: stream_id.into(),
            aggregate_type: aggregate_type.into(),
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn placement(&self, cursor: u64) -> Placement {
        match self.sequence_number {
            0 => Placement::Gap,
            n if n <= cursor => Placement::Seen,
            n if n == cursor + 1 => Placement::Next,
            _ => Placement::Gap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(seq: u64) -> EventEnvelope<()> {
        EventEnvelope::new(Uuid::now_v7(), "A-1001", "fulfillment.order", seq, ())
    }

    #[test]
    fn placement_against_cursor() {
        assert_eq!(at(1).placement(0), Placement::Next);
        assert_eq!(at(3).placement(3), Placement::Seen);
        assert_eq!(at(5).placement(3), Placement::Gap);
        assert_eq!(at(0).placement(0), Placement::Gap);
    }
}

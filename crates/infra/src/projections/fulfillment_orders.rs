use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;
use thiserror::Error;

use depot_core::{Aggregate, OrderNumber};
use depot_events::{EventEnvelope, Placement};
use depot_fulfillment::{AGGREGATE_TYPE, FulfillmentEvent, OrderFulfillment};

use crate::read_model::KeyValueStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("failed to deserialize fulfillment event: {0}")]
    Deserialize(String),
    #[error("event for order {event} delivered on stream {stream}")]
    StreamMismatch { stream: String, event: String },
    #[error("non-monotonic sequence number (last={last}, found={found})")]
    NonMonotonicSequence { last: u64, found: u64 },
}

/// Current fulfillment state per order, folded from the event stream.
///
/// Envelopes are applied in stream order: already-seen sequence numbers are
/// skipped, gaps are rejected.
#[derive(Debug)]
pub struct FulfillmentOrdersProjection<S>
where
    S: KeyValueStore<OrderNumber, OrderFulfillment>,
{
    store: S,
    cursors: RwLock<HashMap<String, u64>>,
}

impl<S> FulfillmentOrdersProjection<S>
where
    S: KeyValueStore<OrderNumber, OrderFulfillment>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cursors: RwLock::new(HashMap::new()),
        }
    }

    fn get_cursor(&self, stream_id: &str) -> u64 {
        match self.cursors.read() {
            Ok(cursors) => *cursors.get(stream_id).unwrap_or(&0),
            Err(_) => 0,
        }
    }

    fn update_cursor(&self, stream_id: &str, seq: u64) {
        if let Ok(mut cursors) = self.cursors.write() {
            cursors.insert(stream_id.to_string(), seq);
        }
    }

    pub fn get(&self, number: &OrderNumber) -> Option<OrderFulfillment> {
        self.store.get(number)
    }

    pub fn list(&self) -> Vec<OrderFulfillment> {
        self.store.list()
    }

    pub fn apply_envelope(&self, envelope: &EventEnvelope<JsonValue>) -> Result<(), ProjectionError> {
        if envelope.aggregate_type() != AGGREGATE_TYPE {
            return Ok(());
        }

        let stream_id = envelope.stream_id();
        let seq = envelope.sequence_number();

        let last = self.get_cursor(stream_id);
        match envelope.placement(last) {
            Placement::Seen => return Ok(()),
            Placement::Gap => return Err(ProjectionError::NonMonotonicSequence { last, found: seq }),
            Placement::Next => {}
        }

        let ev: FulfillmentEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| ProjectionError::Deserialize(e.to_string()))?;

        let number = ev.number().clone();
        if number.to_string() != stream_id {
            return Err(ProjectionError::StreamMismatch {
                stream: stream_id.to_string(),
                event: number.to_string(),
            });
        }

        let mut state = self
            .store
            .get(&number)
            .unwrap_or_else(|| OrderFulfillment::empty(number.clone()));
        state.apply(&ev);
        self.store.upsert(number, state);

        self.update_cursor(stream_id, seq);
        Ok(())
    }

    pub fn rebuild_from_scratch(
        &self,
        envelopes: impl IntoIterator<Item = EventEnvelope<JsonValue>>,
    ) -> Result<(), ProjectionError> {
        let mut envs: Vec<_> = envelopes.into_iter().collect();

        self.store.clear();
        if let Ok(mut cursors) = self.cursors.write() {
            cursors.clear();
        }

        envs.sort_by(|a, b| {
            a.stream_id()
                .cmp(b.stream_id())
                .then(a.sequence_number().cmp(&b.sequence_number()))
        });

        for env in &envs {
            self.apply_envelope(env)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use depot_core::AggregateRoot;
    use depot_fulfillment::{OrderHeader, OrderLineSpec, OrderSynced, PickingStarted, WorkflowStatus};
    use depot_stock::{ProductCode, WarehouseCode};
    use uuid::Uuid;

    use crate::read_model::InMemoryKeyValueStore;

    fn number() -> OrderNumber {
        "A-1001".parse().unwrap()
    }

    fn synced() -> FulfillmentEvent {
        FulfillmentEvent::OrderSynced(OrderSynced {
            number: number(),
            header: OrderHeader {
                customer_code: "C-1".into(),
                customer_name: "Acme".into(),
                order_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                note: None,
            },
            lines: vec![OrderLineSpec {
                row: 1,
                product_code: ProductCode::new("P1").unwrap(),
                product_name: "Bolt".into(),
                warehouse: WarehouseCode::new("W1").unwrap(),
                unit: "PCS".into(),
                secondary_unit: None,
                requested_qty: 10.into(),
                unit_price: 1.into(),
                line_total: 10.into(),
                shelf_code: None,
            }],
            occurred_at: Utc::now(),
        })
    }

    fn started() -> FulfillmentEvent {
        FulfillmentEvent::PickingStarted(PickingStarted {
            number: number(),
            picker: depot_core::PickerId::new("ayse").unwrap(),
            occurred_at: Utc::now(),
        })
    }

    fn envelope(stream: &str, seq: u64, ev: &FulfillmentEvent) -> EventEnvelope<JsonValue> {
        EventEnvelope::new(
            Uuid::now_v7(),
            stream,
            AGGREGATE_TYPE,
            seq,
            serde_json::to_value(ev).unwrap(),
        )
    }

    fn projection() -> FulfillmentOrdersProjection<InMemoryKeyValueStore<OrderNumber, OrderFulfillment>> {
        FulfillmentOrdersProjection::new(InMemoryKeyValueStore::new())
    }

    #[test]
    fn folds_events_in_order_and_skips_duplicates() {
        let p = projection();
        p.apply_envelope(&envelope("A-1001", 1, &synced())).unwrap();
        p.apply_envelope(&envelope("A-1001", 2, &started())).unwrap();
        p.apply_envelope(&envelope("A-1001", 2, &started())).unwrap();

        let state = p.get(&number()).unwrap();
        assert_eq!(state.status(), WorkflowStatus::Picking);
        assert_eq!(state.version(), 2);
    }

    #[test]
    fn rejects_gaps_and_foreign_streams() {
        let p = projection();
        assert!(matches!(
            p.apply_envelope(&envelope("A-1001", 2, &synced())),
            Err(ProjectionError::NonMonotonicSequence { last: 0, found: 2 })
        ));
        assert!(matches!(
            p.apply_envelope(&envelope("B-7", 1, &synced())),
            Err(ProjectionError::StreamMismatch { .. })
        ));
    }

    #[test]
    fn rebuild_replays_unordered_input() {
        let p = projection();
        p.rebuild_from_scratch(vec![
            envelope("A-1001", 2, &started()),
            envelope("A-1001", 1, &synced()),
        ])
        .unwrap();
        assert_eq!(p.list().len(), 1);
        assert_eq!(p.get(&number()).unwrap().status(), WorkflowStatus::Picking);
    }
}

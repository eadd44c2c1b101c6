//! Runs one fulfillment command against its order stream.
//!
//! The stream is read and replayed onto an empty aggregate, the command is
//! decided against that state, and the resulting events are appended with the
//! loaded revision as the expected version. Nothing here touches the read
//! model: the engine feeds committed events to the projection itself.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use depot_core::{Aggregate, DomainError, ExpectedVersion};

use crate::event_store::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Another writer appended between load and append.
    #[error("concurrent update lost the race: {0}")]
    Concurrency(String),
    #[error("failed to deserialize stored event: {0}")]
    Deserialize(String),
    #[error(transparent)]
    Store(EventStoreError),
}

impl From<EventStoreError> for DispatchError {
    fn from(value: EventStoreError) -> Self {
        match value {
            EventStoreError::Concurrency(msg) => DispatchError::Concurrency(msg),
            other => DispatchError::Store(other),
        }
    }
}

/// State after the command plus the events it committed (possibly none).
#[derive(Debug)]
pub struct Dispatched<A> {
    pub aggregate: A,
    pub committed: Vec<StoredEvent>,
}

/// Generic over the store so tests and benches can share one `Arc`.
#[derive(Debug)]
pub struct CommandDispatcher<S> {
    store: S,
}

impl<S> CommandDispatcher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> CommandDispatcher<S>
where
    S: EventStore,
{
    /// `make_aggregate` supplies the blank state history is replayed onto,
    /// normally `OrderFulfillment::empty`.
    pub fn dispatch<A>(
        &self,
        id: A::Id,
        aggregate_type: &str,
        command: A::Command,
        make_aggregate: impl FnOnce(A::Id) -> A,
    ) -> Result<Dispatched<A>, DispatchError>
    where
        A: Aggregate<Error = DomainError>,
        A::Id: core::fmt::Display,
        A::Event: depot_events::Event + Serialize + DeserializeOwned,
    {
        let stream_id = id.to_string();

        let history = self.store.load_stream(&stream_id)?;
        validate_loaded_stream(&stream_id, &history)?;
        let expected = ExpectedVersion::after(stream_version(&history));

        let mut aggregate = make_aggregate(id);
        apply_history(&mut aggregate, &history)?;

        let decided = aggregate.handle(&command)?;
        if decided.is_empty() {
            return Ok(Dispatched {
                aggregate,
                committed: vec![],
            });
        }

        let uncommitted = decided
            .iter()
            .map(|ev| UncommittedEvent::from_typed(stream_id.clone(), aggregate_type, Uuid::now_v7(), ev))
            .collect::<Result<Vec<_>, _>>()?;

        let committed = self.store.append(uncommitted, expected)?;

        for ev in &decided {
            aggregate.apply(ev);
        }

        Ok(Dispatched { aggregate, committed })
    }

    /// Replay a stream without deciding anything.
    pub fn load<A>(&self, id: A::Id, make_aggregate: impl FnOnce(A::Id) -> A) -> Result<A, DispatchError>
    where
        A: Aggregate,
        A::Id: core::fmt::Display,
        A::Event: DeserializeOwned,
    {
        let stream_id = id.to_string();
        let history = self.store.load_stream(&stream_id)?;
        validate_loaded_stream(&stream_id, &history)?;

        let mut aggregate = make_aggregate(id);
        apply_history(&mut aggregate, &history)?;
        Ok(aggregate)
    }
}

fn stream_version(stream: &[StoredEvent]) -> u64 {
    stream.last().map(|e| e.sequence_number).unwrap_or(0)
}

fn validate_loaded_stream(stream_id: &str, stream: &[StoredEvent]) -> Result<(), DispatchError> {
    let corrupt = |msg: String| Err(DispatchError::Store(EventStoreError::InvalidAppend(msg)));
    let mut last = 0u64;
    for (idx, e) in stream.iter().enumerate() {
        if e.stream_id != stream_id {
            return corrupt(format!("{stream_id} returned an event of {} at position {idx}", e.stream_id));
        }
        if e.sequence_number <= last {
            return corrupt(format!("{stream_id} goes from {last} to {}", e.sequence_number));
        }
        last = e.sequence_number;
    }
    Ok(())
}

fn apply_history<A>(aggregate: &mut A, history: &[StoredEvent]) -> Result<(), DispatchError>
where
    A: Aggregate,
    A::Event: DeserializeOwned,
{
    for stored in history {
        let ev: A::Event = serde_json::from_value(stored.payload.clone())
            .map_err(|e| DispatchError::Deserialize(e.to_string()))?;
        aggregate.apply(&ev);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{NaiveDate, Utc};
    use depot_core::{AggregateRoot, OrderNumber, PickerId};
    use depot_fulfillment::{
        AGGREGATE_TYPE, FulfillmentCommand, OrderFulfillment, OrderHeader, OrderLineSpec, StartPicking, SyncOrder,
        WorkflowStatus,
    };
    use depot_stock::{ProductCode, WarehouseCode};

    use crate::event_store::InMemoryEventStore;

    fn number() -> OrderNumber {
        "A-1001".parse().unwrap()
    }

    fn sync() -> FulfillmentCommand {
        FulfillmentCommand::SyncOrder(SyncOrder {
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

    fn start(picker: &str) -> FulfillmentCommand {
        FulfillmentCommand::StartPicking(StartPicking {
            number: number(),
            picker: PickerId::new(picker).unwrap(),
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn dispatch_persists_and_returns_new_state() {
        let store = Arc::new(InMemoryEventStore::new());
        let dispatcher = CommandDispatcher::new(store.clone());

        let created = dispatcher
            .dispatch(number(), AGGREGATE_TYPE, sync(), OrderFulfillment::empty)
            .unwrap();
        assert_eq!(created.committed.len(), 1);
        assert_eq!(created.committed[0].event_type, "fulfillment.order.synced");

        let started = dispatcher
            .dispatch(number(), AGGREGATE_TYPE, start("ayse"), OrderFulfillment::empty)
            .unwrap();
        assert_eq!(started.aggregate.status(), WorkflowStatus::Picking);
        assert_eq!(started.aggregate.version(), 2);
        assert_eq!(store.load_stream("A-1001").unwrap().len(), 2);

        let loaded: OrderFulfillment = dispatcher.load(number(), OrderFulfillment::empty).unwrap();
        assert_eq!(loaded, started.aggregate);
    }

    #[test]
    fn domain_rejection_appends_nothing() {
        let store = Arc::new(InMemoryEventStore::new());
        let dispatcher = CommandDispatcher::new(store.clone());

        let err = dispatcher
            .dispatch(number(), AGGREGATE_TYPE, start("ayse"), OrderFulfillment::empty)
            .unwrap_err();
        assert!(matches!(err, DispatchError::Domain(DomainError::NotFound(_))));
        assert!(store.load_stream("A-1001").unwrap().is_empty());
    }

    #[test]
    fn idempotent_command_commits_nothing() {
        let dispatcher = CommandDispatcher::new(InMemoryEventStore::new());
        dispatcher
            .dispatch(number(), AGGREGATE_TYPE, sync(), OrderFulfillment::empty)
            .unwrap();
        let again = dispatcher
            .dispatch(number(), AGGREGATE_TYPE, sync(), OrderFulfillment::empty)
            .unwrap();
        assert!(again.committed.is_empty());
        assert_eq!(again.aggregate.version(), 1);
    }
}

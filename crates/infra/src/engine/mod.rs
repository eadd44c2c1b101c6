//! `WarehouseEngine`: the application facade over the fulfillment domain.
//!
//! Wires the command dispatcher, the order projection, the reservation table,
//! the stock ledger and the catalog/issue stores together, and implements
//! every engine operation on top of them:
//!
//! - feed side: `sync_order`, `withdraw_order`, `update_stock`, `set_stock_feed_online`
//! - workflow: `start_picking`, `update_line`, `mark_ready_for_loading`, `mark_loaded`, `dispatch`
//! - reads: `list_orders`, `overview`, `order_detail`
//! - catalog: driver and vehicle CRUD
//! - image issues: `report_image_issue`, `list_image_issues`, `update_image_issue`
//!
//! State-changing calls on one order are serialized by a per-order lock.
//! Reads take no order lock: coverage is recomputed from whatever claims are
//! visible at that instant.

use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, error, warn};

use depot_core::{DriverId, OrderNumber, ReportId, VehicleId};
use depot_dispatch::{Driver, Vehicle};
use depot_fulfillment::{AGGREGATE_TYPE, FulfillmentCommand, OrderFulfillment, ReservationTable};
use depot_issues::ImageIssueReport;
use depot_stock::{FeedLedger, StockLedger};

use crate::command_dispatcher::CommandDispatcher;
use crate::config::EngineSettings;
use crate::delivery_numbers::DeliveryNumbers;
use crate::event_store::{EventStore, InMemoryEventStore};
use crate::order_locks::OrderLocks;
use crate::projections::FulfillmentOrdersProjection;
use crate::read_model::InMemoryKeyValueStore;

mod catalog;
mod error;
mod feed;
mod issues;
mod queries;
mod views;
mod workflow;

pub use error::EngineError;
pub use feed::{OrderFeed, OrderFeedLine, StockEntry, SyncOutcome};
pub use views::{
    DispatchRequest, ImageIssueOutcome, LineDetail, LinePatch, OrderDetail, OrderFilter, OrderSummary, Overview,
    StatusCount, StockSnapshot, WorkflowView,
};

use error::poisoned;

type OrderStore = InMemoryKeyValueStore<OrderNumber, OrderFulfillment>;

pub struct WarehouseEngine {
    settings: EngineSettings,
    dispatcher: CommandDispatcher<Arc<dyn EventStore>>,
    orders: FulfillmentOrdersProjection<OrderStore>,
    reservations: RwLock<ReservationTable>,
    locks: OrderLocks,
    stock: Arc<FeedLedger>,
    drivers: InMemoryKeyValueStore<DriverId, Driver>,
    vehicles: InMemoryKeyValueStore<VehicleId, Vehicle>,
    catalog_writes: Mutex<()>,
    issues: InMemoryKeyValueStore<ReportId, ImageIssueReport>,
    issue_writes: Mutex<()>,
    delivery_numbers: DeliveryNumbers,
}

impl WarehouseEngine {
    /// Engine over a fresh in-memory event store.
    pub fn new(settings: EngineSettings) -> Self {
        Self::assemble(settings, Arc::new(InMemoryEventStore::new()))
    }

    /// Engine over an existing event store: the order projection is rebuilt
    /// from the stored streams, delivery-note series resume after the highest
    /// stored number, and claims are re-established for every order that
    /// should hold them, earliest picker start first.
    pub fn with_event_store(settings: EngineSettings, store: Arc<dyn EventStore>) -> Result<Self, EngineError> {
        let engine = Self::assemble(settings, store);

        let history = engine.dispatcher.store().load_all(AGGREGATE_TYPE)?;
        engine
            .orders
            .rebuild_from_scratch(history.iter().map(|e| e.to_envelope()))?;

        let orders = engine.orders.list();
        for note in orders.iter().filter_map(|o| o.dispatch_record()).map(|r| &r.delivery_note) {
            engine.delivery_numbers.observe(note)?;
        }

        let mut claimants: Vec<OrderFulfillment> = orders
            .into_iter()
            .filter(OrderFulfillment::holds_claims)
            .collect();
        claimants.sort_by(|a, b| a.started_at().cmp(&b.started_at()).then_with(|| a.number().cmp(b.number())));
        for order in &claimants {
            engine.refresh_claims(order)?;
        }

        Ok(engine)
    }

    fn assemble(settings: EngineSettings, store: Arc<dyn EventStore>) -> Self {
        Self {
            settings,
            dispatcher: CommandDispatcher::new(store),
            orders: FulfillmentOrdersProjection::new(InMemoryKeyValueStore::new()),
            reservations: RwLock::new(ReservationTable::new()),
            locks: OrderLocks::new(),
            stock: Arc::new(FeedLedger::new()),
            drivers: InMemoryKeyValueStore::new(),
            vehicles: InMemoryKeyValueStore::new(),
            catalog_writes: Mutex::new(()),
            issues: InMemoryKeyValueStore::new(),
            issue_writes: Mutex::new(()),
            delivery_numbers: DeliveryNumbers::new(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// The feed-backed stock ledger this engine reads.
    pub fn stock_ledger(&self) -> Arc<FeedLedger> {
        self.stock.clone()
    }

    /// Run `f` under the lock of `number`.
    fn locked<T>(
        &self,
        number: &OrderNumber,
        f: impl FnOnce() -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        self.locks.with_lock(number, f)?
    }

    /// Dispatch `command` and feed the committed events to the projection.
    /// Returns the resulting state and whether anything was committed.
    fn execute(
        &self,
        number: &OrderNumber,
        command: FulfillmentCommand,
    ) -> Result<(OrderFulfillment, bool), EngineError> {
        let dispatched = self
            .dispatcher
            .dispatch(number.clone(), AGGREGATE_TYPE, command, OrderFulfillment::empty)?;
        for stored in &dispatched.committed {
            self.orders.apply_envelope(&stored.to_envelope())?;
        }
        Ok((dispatched.aggregate, !dispatched.committed.is_empty()))
    }

    fn find(&self, number: &OrderNumber) -> Result<OrderFulfillment, EngineError> {
        self.orders
            .get(number)
            .filter(OrderFulfillment::is_created)
            .ok_or_else(|| depot_core::DomainError::not_found(format!("order {number}")).into())
    }

    /// Bring `order`'s claims in line with its current lines, or release
    /// them all once it no longer holds claims (dispatched or withdrawn).
    fn refresh_claims(&self, order: &OrderFulfillment) -> Result<(), EngineError> {
        let number = order.number();
        let mut table = self
            .reservations
            .write()
            .map_err(|_| poisoned("reservation table"))?;

        if !order.holds_claims() {
            let released = table.release_order(number);
            if !released.is_empty() {
                debug!(order = %number, released = released.len(), "reservation claims released");
            }
            return Ok(());
        }

        for line in order.lines() {
            let key = line.stock_key();
            let on_hand = match self.stock.available(&key) {
                Ok(quantity) => Some(quantity),
                Err(err) => {
                    warn!(order = %number, stock_key = %key, error = %err, "stock lookup failed; claim left as is");
                    None
                }
            };
            let claimed = table.upsert(number, line.row, &key, line.requested_qty, on_hand);
            debug!(order = %number, row = line.row, stock_key = %key, claimed = ?claimed, "claim refreshed");
        }
        table.retain_lines(number, &order.stock_keys());
        Ok(())
    }
}

/// Log a failed operation: domain rejections at `warn`, infrastructure
/// failures at `error`.
fn log_failure<T>(operation: &'static str, number: &OrderNumber, result: Result<T, EngineError>) -> Result<T, EngineError> {
    if let Err(err) = &result {
        match err {
            EngineError::Domain(e) => warn!(order = %number, operation, error = %e, "operation rejected"),
            other => error!(order = %number, operation, error = %other, "operation failed"),
        }
    }
    result
}

use chrono::Utc;
use tracing::info;

use depot_core::{DomainError, OrderNumber, PickerId};
use depot_dispatch::{DeliveryNoteRef, DispatchRecord};
use depot_fulfillment::{
    Dispatch, FulfillmentCommand, MarkLoaded, MarkReadyForLoading, StartPicking, Transition, UpdateLine,
};

use crate::read_model::KeyValueStore;

use super::views::{DispatchRequest, LinePatch, OrderDetail};
use super::{EngineError, WarehouseEngine, log_failure};

impl WarehouseEngine {
    /// Claim an order for a picker. Exactly one of several concurrent callers
    /// wins; the others get `Conflict` naming the owner.
    pub fn start_picking(&self, number: &OrderNumber, picker: &str) -> Result<OrderDetail, EngineError> {
        let result = self.locked(number, || {
            let picker = PickerId::new(picker)?;
            let command = FulfillmentCommand::StartPicking(StartPicking {
                number: number.clone(),
                picker: picker.clone(),
                occurred_at: Utc::now(),
            });
            let (order, _) = self.execute(number, command)?;
            self.refresh_claims(&order)?;
            info!(order = %number, picker = %picker, "picking started");
            Ok(order)
        });
        let order = log_failure("start_picking", number, result)?;
        self.detail_of(&order)
    }

    pub fn update_line(&self, number: &OrderNumber, row: u32, patch: LinePatch) -> Result<OrderDetail, EngineError> {
        let result = self.locked(number, || {
            let command = FulfillmentCommand::UpdateLine(UpdateLine {
                number: number.clone(),
                row,
                picked_qty: patch.picked_qty,
                extra_qty: patch.extra_qty,
                shelf_code: patch.shelf_code,
                occurred_at: Utc::now(),
            });
            let (order, _) = self.execute(number, command)?;
            self.refresh_claims(&order)?;
            if let Some(line) = order.line(row) {
                info!(
                    order = %number,
                    row,
                    picked = %line.picked_qty,
                    extra = %line.extra_qty,
                    status = ?line.status(),
                    "line updated"
                );
            }
            Ok(order)
        });
        let order = log_failure("update_line", number, result)?;
        self.detail_of(&order)
    }

    pub fn mark_ready_for_loading(&self, number: &OrderNumber) -> Result<OrderDetail, EngineError> {
        let result = self.locked(number, || {
            let command = FulfillmentCommand::MarkReadyForLoading(MarkReadyForLoading {
                number: number.clone(),
                occurred_at: Utc::now(),
            });
            let (order, _) = self.execute(number, command)?;
            info!(order = %number, "ready for loading");
            Ok(order)
        });
        let order = log_failure("mark_ready_for_loading", number, result)?;
        self.detail_of(&order)
    }

    /// LOADED when every line is fully picked, PARTIALLY_LOADED otherwise.
    pub fn mark_loaded(&self, number: &OrderNumber) -> Result<OrderDetail, EngineError> {
        let result = self.locked(number, || {
            let command = FulfillmentCommand::MarkLoaded(MarkLoaded {
                number: number.clone(),
                occurred_at: Utc::now(),
            });
            let (order, _) = self.execute(number, command)?;
            info!(order = %number, status = %order.status(), "loading recorded");
            Ok(order)
        });
        let order = log_failure("mark_loaded", number, result)?;
        self.detail_of(&order)
    }

    /// Finalize the order: write the dispatch record and release its claims.
    ///
    /// The delivery number is issued only once the dispatch event is
    /// committed; rejected calls and lost races leave the series untouched.
    pub fn dispatch(&self, number: &OrderNumber, request: DispatchRequest) -> Result<OrderDetail, EngineError> {
        let result = self.locked(number, || {
            let current = self.find(number)?;
            if current.is_withdrawn() {
                return Err(DomainError::conflict(format!("order {number} was withdrawn upstream")).into());
            }
            if !Transition::Dispatch.permitted_from(current.status()) {
                return Err(DomainError::illegal_transition(current.status(), Transition::Dispatch.target()).into());
            }

            let series = request.delivery_series.trim();
            if series.is_empty() {
                return Err(DomainError::validation("delivery_series cannot be empty").into());
            }
            let driver = self
                .drivers
                .get(&request.driver_id)
                .ok_or_else(|| DomainError::validation(format!("driver {} does not exist", request.driver_id)))?;
            let vehicle = self
                .vehicles
                .get(&request.vehicle_id)
                .ok_or_else(|| DomainError::validation(format!("vehicle {} does not exist", request.vehicle_id)))?;

            let now = Utc::now();
            let provisional = DeliveryNoteRef {
                series: series.to_uppercase(),
                number: 0,
            };
            let record = DispatchRecord::compose(provisional, &driver, &vehicle, current.picker().cloned(), now)?;

            let (order, delivery_note) = self.delivery_numbers.issue(series, |note| {
                let delivery_note = note.to_string();
                let command = FulfillmentCommand::Dispatch(Dispatch {
                    number: number.clone(),
                    record: DispatchRecord { delivery_note: note, ..record },
                    occurred_at: now,
                });
                let (order, _) = self.execute(number, command)?;
                Ok::<_, EngineError>((order, delivery_note))
            })?;
            self.refresh_claims(&order)?;
            info!(
                order = %number,
                delivery_note = %delivery_note,
                driver = %request.driver_id,
                vehicle = %request.vehicle_id,
                "order dispatched"
            );
            Ok(order)
        });
        let order = log_failure("dispatch", number, result)?;
        self.detail_of(&order)
    }
}

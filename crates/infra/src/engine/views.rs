//! Read-side shapes returned by the engine. Coverage inside them is computed
//! at read time.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use depot_core::{Decimal, DriverId, OrderNumber, PickerId, Quantity, VehicleId};
use depot_dispatch::DispatchRecord;
use depot_fulfillment::{
    ClaimView, LineCoverage, LineStatus, OrderCoverage, OrderFulfillment, OrderHeader, OrderLine, SecondaryUnit,
    WorkflowStatus,
};
use depot_issues::ImageIssueReport;
use depot_stock::{ProductCode, StockLevel, WarehouseCode};

/// Listing filter; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    pub series: Option<String>,
    /// Case-insensitive match on order number, customer and product fields.
    pub search: Option<String>,
    pub status: Option<WorkflowStatus>,
    #[serde(default)]
    pub include_withdrawn: bool,
}

impl OrderFilter {
    pub fn matches(&self, order: &OrderFulfillment) -> bool {
        if order.is_withdrawn() && !self.include_withdrawn {
            return false;
        }
        if let Some(series) = self.series.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if !order.number().series().eq_ignore_ascii_case(series) {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != order.status()) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => search_matches(order, &needle.to_lowercase()),
            None => true,
        }
    }
}

fn search_matches(order: &OrderFulfillment, needle: &str) -> bool {
    let hit = |haystack: &str| haystack.to_lowercase().contains(needle);
    hit(&order.number().to_string())
        || order
            .header()
            .is_some_and(|h| hit(&h.customer_code) || hit(&h.customer_name))
        || order
            .lines()
            .iter()
            .any(|l| hit(l.product_code.as_str()) || hit(&l.product_name))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub number: OrderNumber,
    pub customer_code: String,
    pub customer_name: String,
    pub order_date: NaiveDate,
    pub status: WorkflowStatus,
    pub picker: Option<PickerId>,
    pub line_count: usize,
    pub requested_total: Quantity,
    pub picked_total: Quantity,
    pub coverage: OrderCoverage,
    pub last_action_at: Option<DateTime<Utc>>,
    pub withdrawn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: WorkflowStatus,
    pub count: usize,
}

/// Order counts per workflow status. Withdrawn orders are counted apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    pub total: usize,
    pub by_status: Vec<StatusCount>,
    pub withdrawn: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowView {
    pub status: WorkflowStatus,
    pub picker: Option<PickerId>,
    pub started_at: Option<DateTime<Utc>>,
    pub loading_started_at: Option<DateTime<Utc>>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub last_action_at: Option<DateTime<Utc>>,
    pub synced_at: Option<DateTime<Utc>>,
    pub withdrawn_at: Option<DateTime<Utc>>,
    pub delivery_note: Option<String>,
    pub dispatch: Option<DispatchRecord>,
}

impl WorkflowView {
    pub(crate) fn of(order: &OrderFulfillment) -> Self {
        let dispatch = order.dispatch_record().cloned();
        Self {
            status: order.status(),
            picker: order.picker().cloned(),
            started_at: order.started_at(),
            loading_started_at: order.loading_started_at(),
            loaded_at: order.loaded_at(),
            dispatched_at: order.dispatched_at(),
            last_action_at: order.last_action_at(),
            synced_at: order.synced_at(),
            withdrawn_at: order.withdrawn_at(),
            delivery_note: dispatch.as_ref().map(|d| d.delivery_note.to_string()),
            dispatch,
        }
    }
}

/// Product stock across warehouses, or `unknown` while the feed is down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StockSnapshot {
    Known { levels: Vec<StockLevel> },
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDetail {
    pub row: u32,
    pub product_code: ProductCode,
    pub product_name: String,
    pub warehouse: WarehouseCode,
    pub unit: String,
    pub secondary_unit: Option<SecondaryUnit>,
    pub requested_qty: Quantity,
    pub requested_secondary_qty: Option<Quantity>,
    pub picked_qty: Quantity,
    pub extra_qty: Quantity,
    pub shortage_qty: Quantity,
    pub status: LineStatus,
    pub shelf_code: Option<String>,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub coverage: LineCoverage,
    pub stock: StockSnapshot,
    pub claims: Vec<ClaimView>,
}

impl LineDetail {
    pub(crate) fn of(line: &OrderLine, coverage: LineCoverage, stock: StockSnapshot, claims: Vec<ClaimView>) -> Self {
        Self {
            row: line.row,
            product_code: line.product_code.clone(),
            product_name: line.product_name.clone(),
            warehouse: line.warehouse.clone(),
            unit: line.unit.clone(),
            secondary_unit: line.secondary_unit.clone(),
            requested_qty: line.requested_qty,
            requested_secondary_qty: line.requested_in_secondary(),
            picked_qty: line.picked_qty,
            extra_qty: line.extra_qty,
            shortage_qty: line.shortage_qty(),
            status: line.status(),
            shelf_code: line.shelf_code.clone(),
            unit_price: line.unit_price,
            line_total: line.line_total,
            coverage,
            stock,
            claims,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub number: OrderNumber,
    pub header: OrderHeader,
    pub workflow: WorkflowView,
    pub coverage: OrderCoverage,
    pub lines: Vec<LineDetail>,
}

impl OrderDetail {
    pub fn line(&self, row: u32) -> Option<&LineDetail> {
        self.lines.iter().find(|l| l.row == row)
    }
}

/// Patch for one order line; unset fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePatch {
    #[serde(default)]
    pub picked_qty: Option<Quantity>,
    #[serde(default)]
    pub extra_qty: Option<Quantity>,
    /// An empty string clears the shelf code.
    #[serde(default)]
    pub shelf_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageIssueOutcome {
    pub report: ImageIssueReport,
    pub already_reported: bool,
}

/// Transport details supplied with the dispatch call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub delivery_series: String,
    pub driver_id: DriverId,
    pub vehicle_id: VehicleId,
}

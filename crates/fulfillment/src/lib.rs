//! Order fulfillment domain module (event-sourced).
//!
//! Business rules for picking, loading and dispatching ERP sales orders, plus
//! the cross-order stock reservation table and coverage analysis. Pure,
//! deterministic domain logic (no IO, no HTTP, no storage); live stock levels
//! arrive through the `depot_stock::StockLedger` seam.

pub mod coverage;
pub mod line;
pub mod order;
pub mod reservation;

pub use coverage::{
    CoverageReport, LineCoverage, LineCoverageStatus, OrderCoverage, OrderCoverageStatus, compute,
    line_coverage, order_coverage,
};
pub use line::{LineStatus, OrderLine, OrderLineSpec, SecondaryUnit, derive_line_status, shortage};
pub use order::{
    AGGREGATE_TYPE, Dispatch, FulfillmentCommand, FulfillmentEvent, LineUpdated, LoadingRecorded,
    MarkLoaded, MarkReadyForLoading, OrderDispatched, OrderFulfillment, OrderHeader, OrderSynced,
    OrderWithdrawn, PickingStarted, ReadyForLoading, StartPicking, SyncOrder, Transition,
    UpdateLine, WithdrawOrder, WorkflowStatus,
};
pub use reservation::{Claim, ClaimView, ReservationTable};

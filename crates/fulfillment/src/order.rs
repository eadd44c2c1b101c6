use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use depot_core::{Aggregate, AggregateRoot, DomainError, OrderNumber, PickerId, Quantity};
use depot_dispatch::DispatchRecord;
use depot_events::Event;
use depot_stock::StockKey;

use crate::line::{OrderLine, OrderLineSpec};

/// Aggregate type name used for fulfillment event streams.
pub const AGGREGATE_TYPE: &str = "fulfillment.order";

/// Fulfillment workflow status (distinct from the ERP's commercial status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Pending,
    Picking,
    ReadyForLoading,
    PartiallyLoaded,
    Loaded,
    Dispatched,
}

impl WorkflowStatus {
    pub const ALL: [WorkflowStatus; 6] = [
        WorkflowStatus::Pending,
        WorkflowStatus::Picking,
        WorkflowStatus::ReadyForLoading,
        WorkflowStatus::PartiallyLoaded,
        WorkflowStatus::Loaded,
        WorkflowStatus::Dispatched,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Pending => "PENDING",
            WorkflowStatus::Picking => "PICKING",
            WorkflowStatus::ReadyForLoading => "READY_FOR_LOADING",
            WorkflowStatus::PartiallyLoaded => "PARTIALLY_LOADED",
            WorkflowStatus::Loaded => "LOADED",
            WorkflowStatus::Dispatched => "DISPATCHED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Dispatched)
    }
}

impl core::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for WorkflowStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        WorkflowStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| DomainError::validation(format!("unknown workflow status '{s}'")))
    }
}

/// Workflow actions, each with the set of states it may be taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Start,
    UpdateLine,
    ReadyForLoading,
    Load,
    Dispatch,
}

impl Transition {
    pub const ALL: [Transition; 5] = [
        Transition::Start,
        Transition::UpdateLine,
        Transition::ReadyForLoading,
        Transition::Load,
        Transition::Dispatch,
    ];

    /// Name of the requested state, as reported in `IllegalTransition`.
    pub fn target(&self) -> &'static str {
        match self {
            Transition::Start => "PICKING",
            Transition::UpdateLine => "LINE_UPDATE",
            Transition::ReadyForLoading => "READY_FOR_LOADING",
            Transition::Load => "LOADED",
            Transition::Dispatch => "DISPATCHED",
        }
    }

    pub fn permitted_from(&self, status: WorkflowStatus) -> bool {
        use WorkflowStatus::*;
        match self {
            Transition::Start => status == Pending,
            Transition::UpdateLine => matches!(status, Picking | ReadyForLoading),
            Transition::ReadyForLoading => matches!(status, Picking | PartiallyLoaded),
            Transition::Load => matches!(status, Picking | ReadyForLoading),
            Transition::Dispatch => matches!(status, Loaded | PartiallyLoaded),
        }
    }
}

/// Order header as supplied by the ERP feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHeader {
    pub customer_code: String,
    pub customer_name: String,
    pub order_date: NaiveDate,
    pub note: Option<String>,
}

/// Aggregate root: OrderFulfillment (one per ERP order number).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFulfillment {
    number: OrderNumber,
    header: Option<OrderHeader>,
    lines: Vec<OrderLine>,
    status: WorkflowStatus,
    picker: Option<PickerId>,
    started_at: Option<DateTime<Utc>>,
    loading_started_at: Option<DateTime<Utc>>,
    loaded_at: Option<DateTime<Utc>>,
    dispatched_at: Option<DateTime<Utc>>,
    dispatch: Option<DispatchRecord>,
    synced_at: Option<DateTime<Utc>>,
    last_action_at: Option<DateTime<Utc>>,
    withdrawn_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl OrderFulfillment {
    /// Blank state for an order the feed has not sent yet; history replays onto it.
    pub fn empty(number: OrderNumber) -> Self {
        Self {
            number,
            header: None,
            lines: Vec::new(),
            status: WorkflowStatus::Pending,
            picker: None,
            started_at: None,
            loading_started_at: None,
            loaded_at: None,
            dispatched_at: None,
            dispatch: None,
            synced_at: None,
            last_action_at: None,
            withdrawn_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn number(&self) -> &OrderNumber {
        &self.number
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn header(&self) -> Option<&OrderHeader> {
        self.header.as_ref()
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn line(&self, row: u32) -> Option<&OrderLine> {
        self.lines.iter().find(|l| l.row == row)
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn picker(&self) -> Option<&PickerId> {
        self.picker.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn loading_started_at(&self) -> Option<DateTime<Utc>> {
        self.loading_started_at
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn dispatched_at(&self) -> Option<DateTime<Utc>> {
        self.dispatched_at
    }

    pub fn dispatch_record(&self) -> Option<&DispatchRecord> {
        self.dispatch.as_ref()
    }

    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.synced_at
    }

    /// Last picker/operator action. Exposed so a supervisory process can spot
    /// orders claimed but stalled; this engine never expires a claim itself.
    pub fn last_action_at(&self) -> Option<DateTime<Utc>> {
        self.last_action_at
    }

    pub fn withdrawn_at(&self) -> Option<DateTime<Utc>> {
        self.withdrawn_at
    }

    pub fn is_withdrawn(&self) -> bool {
        self.withdrawn_at.is_some()
    }

    /// Whether this order's lines should hold reservation claims.
    pub fn holds_claims(&self) -> bool {
        self.created && !self.is_withdrawn() && !matches!(self.status, WorkflowStatus::Pending | WorkflowStatus::Dispatched)
    }

    pub fn stock_keys(&self) -> Vec<(u32, StockKey)> {
        self.lines.iter().map(|l| (l.row, l.stock_key())).collect()
    }

    pub fn requested_total(&self) -> Quantity {
        self.lines.iter().map(|l| l.requested_qty).sum()
    }

    pub fn picked_total(&self) -> Quantity {
        self.lines.iter().map(|l| l.picked_qty).sum()
    }
}

impl AggregateRoot for OrderFulfillment {
    type Id = OrderNumber;

    fn id(&self) -> &Self::Id {
        &self.number
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: SyncOrder (create or refresh from the ERP feed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOrder {
    pub number: OrderNumber,
    pub header: OrderHeader,
    pub lines: Vec<OrderLineSpec>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: StartPicking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPicking {
    pub number: OrderNumber,
    pub picker: PickerId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateLine. Unset fields are left as they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLine {
    pub number: OrderNumber,
    pub row: u32,
    pub picked_qty: Option<Quantity>,
    pub extra_qty: Option<Quantity>,
    /// `Some("")` clears the shelf code.
    pub shelf_code: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkReadyForLoading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkReadyForLoading {
    pub number: OrderNumber,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkLoaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkLoaded {
    pub number: OrderNumber,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Dispatch. The record is composed (and catalog entries checked)
/// before the command is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    pub number: OrderNumber,
    pub record: DispatchRecord,
    pub occurred_at: DateTime<Utc>,
}

/// Command: WithdrawOrder (order voided upstream).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawOrder {
    pub number: OrderNumber,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FulfillmentCommand {
    SyncOrder(SyncOrder),
    StartPicking(StartPicking),
    UpdateLine(UpdateLine),
    MarkReadyForLoading(MarkReadyForLoading),
    MarkLoaded(MarkLoaded),
    Dispatch(Dispatch),
    WithdrawOrder(WithdrawOrder),
}

/// Event: OrderSynced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSynced {
    pub number: OrderNumber,
    pub header: OrderHeader,
    pub lines: Vec<OrderLineSpec>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PickingStarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingStarted {
    pub number: OrderNumber,
    pub picker: PickerId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LineUpdated (carries resulting values, not deltas).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineUpdated {
    pub number: OrderNumber,
    pub row: u32,
    pub picked_qty: Quantity,
    pub extra_qty: Quantity,
    pub shelf_code: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReadyForLoading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyForLoading {
    pub number: OrderNumber,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LoadingRecorded (`complete` selects LOADED vs PARTIALLY_LOADED).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingRecorded {
    pub number: OrderNumber,
    pub complete: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderDispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDispatched {
    pub number: OrderNumber,
    pub record: DispatchRecord,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderWithdrawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWithdrawn {
    pub number: OrderNumber,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FulfillmentEvent {
    OrderSynced(OrderSynced),
    PickingStarted(PickingStarted),
    LineUpdated(LineUpdated),
    ReadyForLoading(ReadyForLoading),
    LoadingRecorded(LoadingRecorded),
    OrderDispatched(OrderDispatched),
    OrderWithdrawn(OrderWithdrawn),
}

impl FulfillmentEvent {
    pub fn number(&self) -> &OrderNumber {
        match self {
            FulfillmentEvent::OrderSynced(e) => &e.number,
            FulfillmentEvent::PickingStarted(e) => &e.number,
            FulfillmentEvent::LineUpdated(e) => &e.number,
            FulfillmentEvent::ReadyForLoading(e) => &e.number,
            FulfillmentEvent::LoadingRecorded(e) => &e.number,
            FulfillmentEvent::OrderDispatched(e) => &e.number,
            FulfillmentEvent::OrderWithdrawn(e) => &e.number,
        }
    }
}

impl Event for FulfillmentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FulfillmentEvent::OrderSynced(_) => "fulfillment.order.synced",
            FulfillmentEvent::PickingStarted(_) => "fulfillment.order.picking_started",
            FulfillmentEvent::LineUpdated(_) => "fulfillment.order.line_updated",
            FulfillmentEvent::ReadyForLoading(_) => "fulfillment.order.ready_for_loading",
            FulfillmentEvent::LoadingRecorded(_) => "fulfillment.order.loading_recorded",
            FulfillmentEvent::OrderDispatched(_) => "fulfillment.order.dispatched",
            FulfillmentEvent::OrderWithdrawn(_) => "fulfillment.order.withdrawn",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            FulfillmentEvent::OrderSynced(e) => e.occurred_at,
            FulfillmentEvent::PickingStarted(e) => e.occurred_at,
            FulfillmentEvent::LineUpdated(e) => e.occurred_at,
            FulfillmentEvent::ReadyForLoading(e) => e.occurred_at,
            FulfillmentEvent::LoadingRecorded(e) => e.occurred_at,
            FulfillmentEvent::OrderDispatched(e) => e.occurred_at,
            FulfillmentEvent::OrderWithdrawn(e) => e.occurred_at,
        }
    }

    fn stream_id(&self) -> String {
        self.number().to_string()
    }
}

impl Aggregate for OrderFulfillment {
    type Command = FulfillmentCommand;
    type Event = FulfillmentEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            FulfillmentEvent::OrderSynced(e) => {
                if !self.created {
                    self.number = e.number.clone();
                    self.status = WorkflowStatus::Pending;
                    self.created = true;
                }
                self.header = Some(e.header.clone());
                self.lines = e
                    .lines
                    .iter()
                    .map(|spec| match self.line(spec.row) {
                        Some(existing) => existing.rebase(spec),
                        None => OrderLine::from_spec(spec),
                    })
                    .collect();
                self.withdrawn_at = None;
                self.synced_at = Some(e.occurred_at);
            }
            FulfillmentEvent::PickingStarted(e) => {
                self.status = WorkflowStatus::Picking;
                self.picker = Some(e.picker.clone());
                self.started_at = Some(e.occurred_at);
                self.last_action_at = Some(e.occurred_at);
            }
            FulfillmentEvent::LineUpdated(e) => {
                if let Some(line) = self.lines.iter_mut().find(|l| l.row == e.row) {
                    line.picked_qty = e.picked_qty;
                    line.extra_qty = e.extra_qty;
                    line.shelf_code = e.shelf_code.clone();
                    line.touched = true;
                }
                self.last_action_at = Some(e.occurred_at);
            }
            FulfillmentEvent::ReadyForLoading(e) => {
                self.status = WorkflowStatus::ReadyForLoading;
                self.loading_started_at.get_or_insert(e.occurred_at);
                self.last_action_at = Some(e.occurred_at);
            }
            FulfillmentEvent::LoadingRecorded(e) => {
                self.status = if e.complete {
                    WorkflowStatus::Loaded
                } else {
                    WorkflowStatus::PartiallyLoaded
                };
                self.loaded_at = Some(e.occurred_at);
                self.last_action_at = Some(e.occurred_at);
            }
            FulfillmentEvent::OrderDispatched(e) => {
                self.status = WorkflowStatus::Dispatched;
                self.dispatch = Some(e.record.clone());
                self.dispatched_at = Some(e.occurred_at);
                self.last_action_at = Some(e.occurred_at);
            }
            FulfillmentEvent::OrderWithdrawn(e) => {
                self.withdrawn_at = Some(e.occurred_at);
                self.last_action_at = Some(e.occurred_at);
            }
        }

        // One revision per event, matching the stream sequence.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            FulfillmentCommand::SyncOrder(cmd) => self.handle_sync(cmd),
            FulfillmentCommand::StartPicking(cmd) => self.handle_start(cmd),
            FulfillmentCommand::UpdateLine(cmd) => self.handle_update_line(cmd),
            FulfillmentCommand::MarkReadyForLoading(cmd) => self.handle_ready(cmd),
            FulfillmentCommand::MarkLoaded(cmd) => self.handle_mark_loaded(cmd),
            FulfillmentCommand::Dispatch(cmd) => self.handle_dispatch(cmd),
            FulfillmentCommand::WithdrawOrder(cmd) => self.handle_withdraw(cmd),
        }
    }
}

impl OrderFulfillment {
    fn ensure_order(&self, number: &OrderNumber) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("order {number}")));
        }
        if &self.number != number {
            return Err(DomainError::validation(format!(
                "command for order {number} routed to order {}",
                self.number
            )));
        }
        if self.is_withdrawn() {
            return Err(DomainError::conflict(format!(
                "order {number} was withdrawn upstream"
            )));
        }
        Ok(())
    }

    fn ensure_permits(&self, transition: Transition) -> Result<(), DomainError> {
        if transition.permitted_from(self.status) {
            Ok(())
        } else {
            Err(DomainError::illegal_transition(self.status, transition.target()))
        }
    }

    fn handle_sync(&self, cmd: &SyncOrder) -> Result<Vec<FulfillmentEvent>, DomainError> {
        if self.created && self.number != cmd.number {
            return Err(DomainError::validation("order number mismatch"));
        }
        validate_line_specs(&cmd.lines)?;

        // Dispatched records are history; later feed resends do not touch them.
        if self.status.is_terminal() {
            return Ok(vec![]);
        }

        let unchanged = self.created
            && !self.is_withdrawn()
            && self.header.as_ref() == Some(&cmd.header)
            && self.lines.len() == cmd.lines.len()
            && cmd
                .lines
                .iter()
                .all(|spec| self.line(spec.row).is_some_and(|l| l.base_matches(spec)));
        if unchanged {
            return Ok(vec![]);
        }

        Ok(vec![FulfillmentEvent::OrderSynced(OrderSynced {
            number: cmd.number.clone(),
            header: cmd.header.clone(),
            lines: cmd.lines.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_start(&self, cmd: &StartPicking) -> Result<Vec<FulfillmentEvent>, DomainError> {
        self.ensure_order(&cmd.number)?;

        if self.status == WorkflowStatus::Picking {
            let owner = self
                .picker
                .as_ref()
                .map(|p| p.as_str())
                .unwrap_or("another picker");
            return Err(DomainError::conflict(format!(
                "order {} is already being picked by {owner}",
                cmd.number
            )));
        }
        self.ensure_permits(Transition::Start)?;

        Ok(vec![FulfillmentEvent::PickingStarted(PickingStarted {
            number: cmd.number.clone(),
            picker: cmd.picker.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_line(&self, cmd: &UpdateLine) -> Result<Vec<FulfillmentEvent>, DomainError> {
        self.ensure_order(&cmd.number)?;
        self.ensure_permits(Transition::UpdateLine)?;

        if cmd.picked_qty.is_none() && cmd.extra_qty.is_none() && cmd.shelf_code.is_none() {
            return Err(DomainError::validation(
                "line update must set picked_qty, extra_qty or shelf_code",
            ));
        }
        if cmd.extra_qty.is_some_and(|q| q.is_sign_negative() && !q.is_zero()) {
            return Err(DomainError::validation("extra_qty cannot be negative"));
        }

        let line = self.line(cmd.row).ok_or_else(|| {
            DomainError::not_found(format!("line {} of order {}", cmd.row, cmd.number))
        })?;

        let picked_qty = cmd
            .picked_qty
            .map(|q| q.max(Quantity::ZERO))
            .unwrap_or(line.picked_qty);
        let extra_qty = cmd.extra_qty.unwrap_or(line.extra_qty);
        let shelf_code = match &cmd.shelf_code {
            Some(code) if code.trim().is_empty() => None,
            Some(code) => Some(code.trim().to_string()),
            None => line.shelf_code.clone(),
        };

        Ok(vec![FulfillmentEvent::LineUpdated(LineUpdated {
            number: cmd.number.clone(),
            row: cmd.row,
            picked_qty,
            extra_qty,
            shelf_code,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_ready(&self, cmd: &MarkReadyForLoading) -> Result<Vec<FulfillmentEvent>, DomainError> {
        self.ensure_order(&cmd.number)?;
        self.ensure_permits(Transition::ReadyForLoading)?;

        Ok(vec![FulfillmentEvent::ReadyForLoading(ReadyForLoading {
            number: cmd.number.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_loaded(&self, cmd: &MarkLoaded) -> Result<Vec<FulfillmentEvent>, DomainError> {
        self.ensure_order(&cmd.number)?;
        self.ensure_permits(Transition::Load)?;

        let complete = self.lines.iter().all(OrderLine::is_fully_picked);

        Ok(vec![FulfillmentEvent::LoadingRecorded(LoadingRecorded {
            number: cmd.number.clone(),
            complete,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_dispatch(&self, cmd: &Dispatch) -> Result<Vec<FulfillmentEvent>, DomainError> {
        self.ensure_order(&cmd.number)?;
        self.ensure_permits(Transition::Dispatch)?;

        Ok(vec![FulfillmentEvent::OrderDispatched(OrderDispatched {
            number: cmd.number.clone(),
            record: cmd.record.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_withdraw(&self, cmd: &WithdrawOrder) -> Result<Vec<FulfillmentEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found(format!("order {}", cmd.number)));
        }
        if self.is_withdrawn() {
            return Ok(vec![]);
        }
        if self.status.is_terminal() {
            return Err(DomainError::conflict(format!(
                "order {} is already dispatched and cannot be withdrawn",
                cmd.number
            )));
        }

        Ok(vec![FulfillmentEvent::OrderWithdrawn(OrderWithdrawn {
            number: cmd.number.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

fn validate_line_specs(lines: &[OrderLineSpec]) -> Result<(), DomainError> {
    if lines.is_empty() {
        return Err(DomainError::validation("order must have at least one line"));
    }
    let mut rows: Vec<u32> = lines.iter().map(|l| l.row).collect();
    rows.sort_unstable();
    if let Some(w) = rows.windows(2).find(|w| w[0] == w[1]) {
        return Err(DomainError::validation(format!("duplicate line row {}", w[0])));
    }
    for line in lines {
        if line.requested_qty.is_sign_negative() && !line.requested_qty.is_zero() {
            return Err(DomainError::validation(format!(
                "line {}: requested_qty cannot be negative",
                line.row
            )));
        }
        if line
            .secondary_unit
            .as_ref()
            .is_some_and(|s| s.factor <= Quantity::ZERO)
        {
            return Err(DomainError::validation(format!(
                "line {}: secondary unit factor must be positive",
                line.row
            )));
        }
    }
    Ok(())
}

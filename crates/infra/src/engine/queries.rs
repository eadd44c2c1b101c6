use tracing::debug;

use depot_core::OrderNumber;
use depot_fulfillment::{CoverageReport, OrderFulfillment, WorkflowStatus, compute};
use depot_stock::StockLedger;

use super::error::poisoned;
use super::views::{LineDetail, OrderDetail, OrderFilter, OrderSummary, Overview, StatusCount, StockSnapshot, WorkflowView};
use super::{EngineError, WarehouseEngine};

impl WarehouseEngine {
    /// Order summaries matching `filter`, by order date then number.
    pub fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>, EngineError> {
        let mut orders: Vec<OrderFulfillment> = self
            .orders
            .list()
            .into_iter()
            .filter(|o| o.is_created() && filter.matches(o))
            .collect();
        orders.sort_by(|a, b| {
            let date = |o: &OrderFulfillment| o.header().map(|h| h.order_date);
            date(a).cmp(&date(b)).then_with(|| a.number().cmp(b.number()))
        });

        orders.iter().map(|o| self.summary_of(o)).collect()
    }

    pub fn overview(&self) -> Overview {
        let orders: Vec<OrderFulfillment> = self.orders.list().into_iter().filter(|o| o.is_created()).collect();
        let (withdrawn, active): (Vec<_>, Vec<_>) = orders.into_iter().partition(|o| o.is_withdrawn());

        Overview {
            total: active.len(),
            by_status: WorkflowStatus::ALL
                .into_iter()
                .map(|status| StatusCount {
                    status,
                    count: active.iter().filter(|o| o.status() == status).count(),
                })
                .collect(),
            withdrawn: withdrawn.len(),
        }
    }

    pub fn order_detail(&self, number: &OrderNumber) -> Result<OrderDetail, EngineError> {
        let order = self.find(number)?;
        self.detail_of(&order)
    }

    fn coverage_of(&self, order: &OrderFulfillment) -> Result<CoverageReport, EngineError> {
        let table = self.reservations.read().map_err(|_| poisoned("reservation table"))?;
        let report = compute(order.number(), order.lines(), self.stock.as_ref(), &table);
        debug!(
            order = %order.number(),
            coverage = ?report.order.status,
            covered_percent = %report.order.covered_percent,
            "coverage computed"
        );
        Ok(report)
    }

    fn summary_of(&self, order: &OrderFulfillment) -> Result<OrderSummary, EngineError> {
        let header = order
            .header()
            .ok_or_else(|| depot_core::DomainError::not_found(format!("order {}", order.number())))?;
        let coverage = self.coverage_of(order)?;

        Ok(OrderSummary {
            number: order.number().clone(),
            customer_code: header.customer_code.clone(),
            customer_name: header.customer_name.clone(),
            order_date: header.order_date,
            status: order.status(),
            picker: order.picker().cloned(),
            line_count: order.lines().len(),
            requested_total: order.requested_total(),
            picked_total: order.picked_total(),
            coverage: coverage.order,
            last_action_at: order.last_action_at(),
            withdrawn: order.is_withdrawn(),
        })
    }

    pub(super) fn detail_of(&self, order: &OrderFulfillment) -> Result<OrderDetail, EngineError> {
        let number = order.number();
        let header = order
            .header()
            .cloned()
            .ok_or_else(|| depot_core::DomainError::not_found(format!("order {number}")))?;
        let CoverageReport {
            order: order_coverage,
            lines: line_coverages,
        } = self.coverage_of(order)?;
        let table = self.reservations.read().map_err(|_| poisoned("reservation table"))?;

        // `compute` yields one entry per line, in line order.
        let lines = order
            .lines()
            .iter()
            .zip(line_coverages)
            .map(|(line, line_coverage)| {
                let stock = match self.stock.levels(&line.product_code) {
                    Ok(levels) => StockSnapshot::Known { levels },
                    Err(_) => StockSnapshot::Unknown,
                };
                let claims = table.claims_on(&line.stock_key(), number);
                LineDetail::of(line, line_coverage, stock, claims)
            })
            .collect();

        Ok(OrderDetail {
            number: number.clone(),
            header,
            workflow: WorkflowView::of(order),
            coverage: order_coverage,
            lines,
        })
    }
}

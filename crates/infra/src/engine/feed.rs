//! Inputs accepted from the upstream ERP and inventory feeds.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use depot_core::{Decimal, DomainError, OrderNumber, Quantity};
use depot_fulfillment::{FulfillmentCommand, OrderHeader, OrderLineSpec, SecondaryUnit, SyncOrder, WithdrawOrder};
use depot_stock::{ProductCode, StockKey, WarehouseCode};

use super::{EngineError, WarehouseEngine, log_failure};

/// One order as delivered by the ERP order feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFeed {
    pub customer_code: String,
    pub customer_name: String,
    pub order_date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
    pub lines: Vec<OrderFeedLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFeedLine {
    pub row: u32,
    pub product_code: String,
    pub product_name: String,
    pub unit: String,
    #[serde(default)]
    pub secondary_unit: Option<SecondaryUnit>,
    pub requested_qty: Quantity,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub line_total: Decimal,
    /// Falls back to the configured default warehouse.
    #[serde(default)]
    pub warehouse_code: Option<String>,
    #[serde(default)]
    pub shelf_code: Option<String>,
}

impl OrderFeed {
    pub(crate) fn into_command(
        self,
        number: OrderNumber,
        default_warehouse: &WarehouseCode,
        now: DateTime<Utc>,
    ) -> Result<SyncOrder, DomainError> {
        if self.customer_code.trim().is_empty() {
            return Err(DomainError::validation("customer_code cannot be empty"));
        }

        let lines = self
            .lines
            .into_iter()
            .map(|line| {
                let warehouse = match line.warehouse_code.as_deref().map(str::trim) {
                    Some(code) if !code.is_empty() => WarehouseCode::new(code)?,
                    _ => default_warehouse.clone(),
                };
                Ok(OrderLineSpec {
                    row: line.row,
                    product_code: ProductCode::new(line.product_code)?,
                    product_name: line.product_name.trim().to_string(),
                    warehouse,
                    unit: line.unit.trim().to_string(),
                    secondary_unit: line.secondary_unit,
                    requested_qty: line.requested_qty,
                    unit_price: line.unit_price,
                    line_total: line.line_total,
                    shelf_code: line
                        .shelf_code
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty()),
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(SyncOrder {
            number,
            header: OrderHeader {
                customer_code: self.customer_code.trim().to_string(),
                customer_name: self.customer_name.trim().to_string(),
                order_date: self.order_date,
                note: self.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            },
            lines,
            occurred_at: now,
        })
    }
}

/// One on-hand quantity reported by the inventory feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub product_code: String,
    pub warehouse_code: String,
    pub quantity: Quantity,
}

impl StockEntry {
    pub(crate) fn into_pair(self) -> Result<(StockKey, Quantity), DomainError> {
        let key = StockKey::new(ProductCode::new(self.product_code)?, WarehouseCode::new(self.warehouse_code)?);
        Ok((key, self.quantity))
    }
}

/// What a feed resend did to the fulfillment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncOutcome {
    Created,
    Updated,
    Unchanged,
    /// The order is already dispatched; its record is history.
    Ignored,
}

impl WarehouseEngine {
    /// Create or refresh an order from the ERP feed.
    ///
    /// Lines are reconciled by row; pick progress survives. A resend of a
    /// withdrawn order reinstates it. Dispatched orders are left untouched.
    pub fn sync_order(&self, number: &OrderNumber, feed: OrderFeed) -> Result<SyncOutcome, EngineError> {
        let result = self.locked(number, || {
            let before = self.orders.get(number).filter(|o| o.is_created());
            if before.as_ref().is_some_and(|o| o.status().is_terminal()) {
                warn!(order = %number, "feed resend for dispatched order ignored");
                return Ok(SyncOutcome::Ignored);
            }

            let command = feed.into_command(number.clone(), &self.settings.default_warehouse, Utc::now())?;
            let (order, changed) = self.execute(number, FulfillmentCommand::SyncOrder(command))?;
            if !changed {
                return Ok(SyncOutcome::Unchanged);
            }

            self.refresh_claims(&order)?;
            let outcome = if before.is_some() {
                SyncOutcome::Updated
            } else {
                SyncOutcome::Created
            };
            info!(order = %number, outcome = ?outcome, lines = order.lines().len(), "order synced from feed");
            Ok(outcome)
        });
        log_failure("sync_order", number, result)
    }

    /// The order was voided upstream: flag it withdrawn and release its claims
    /// at once. Withdrawing twice is a no-op.
    pub fn withdraw_order(&self, number: &OrderNumber) -> Result<(), EngineError> {
        let result = self.locked(number, || {
            let command = FulfillmentCommand::WithdrawOrder(WithdrawOrder {
                number: number.clone(),
                occurred_at: Utc::now(),
            });
            let (order, changed) = self.execute(number, command)?;
            self.refresh_claims(&order)?;
            if changed {
                info!(order = %number, status = %order.status(), "order withdrawn upstream");
            }
            Ok(())
        });
        log_failure("withdraw_order", number, result)
    }

    /// Record on-hand quantities from the inventory feed. Existing claims are
    /// not resized; coverage picks the new levels up on the next read.
    pub fn update_stock(&self, entries: Vec<StockEntry>) -> Result<usize, EngineError> {
        let pairs = entries
            .into_iter()
            .map(StockEntry::into_pair)
            .collect::<Result<Vec<_>, DomainError>>()?;
        let written = self.stock.record(pairs)?;
        info!(entries = written, "stock levels recorded");
        Ok(written)
    }

    /// Mark the inventory feed reachable or not. While offline, coverage
    /// degrades to UNKNOWN and no new claims are sized.
    pub fn set_stock_feed_online(&self, online: bool) {
        self.stock.set_online(online);
        if online {
            info!("stock feed marked online");
        } else {
            warn!("stock feed marked offline; coverage will report UNKNOWN");
        }
    }

    pub fn stock_feed_online(&self) -> bool {
        self.stock.is_online()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn feed_line(warehouse: Option<&str>) -> OrderFeedLine {
        OrderFeedLine {
            row: 1,
            product_code: " P1 ".into(),
            product_name: "Bolt".into(),
            unit: "PCS".into(),
            secondary_unit: None,
            requested_qty: dec!(4),
            unit_price: dec!(1),
            line_total: dec!(4),
            warehouse_code: warehouse.map(str::to_string),
            shelf_code: Some("  ".into()),
        }
    }

    fn feed(lines: Vec<OrderFeedLine>) -> OrderFeed {
        OrderFeed {
            customer_code: "C-1".into(),
            customer_name: "Acme".into(),
            order_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            note: None,
            lines,
        }
    }

    #[test]
    fn missing_warehouse_falls_back_to_default() {
        let main = WarehouseCode::new("MAIN").unwrap();
        let cmd = feed(vec![feed_line(None)])
            .into_command("A-1".parse().unwrap(), &main, Utc::now())
            .unwrap();
        assert_eq!(cmd.lines[0].warehouse, main);
        assert_eq!(cmd.lines[0].product_code.as_str(), "P1");
        assert_eq!(cmd.lines[0].shelf_code, None);

        let cmd = feed(vec![feed_line(Some("W2"))])
            .into_command("A-1".parse().unwrap(), &main, Utc::now())
            .unwrap();
        assert_eq!(cmd.lines[0].warehouse.as_str(), "W2");
    }

    #[test]
    fn blank_product_code_is_rejected() {
        let mut line = feed_line(None);
        line.product_code = " ".into();
        let err = feed(vec![line])
            .into_command("A-1".parse().unwrap(), &WarehouseCode::new("MAIN").unwrap(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}

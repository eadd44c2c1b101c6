//! Coverage Calculator.
//!
//! Derives, from the stock ledger, the reservation table and an order's
//! lines, how far available stock satisfies each line and the order. Always
//! computed on demand; never stored.

use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use depot_core::{Decimal, OrderNumber, Quantity};
use depot_stock::StockLedger;

use crate::line::OrderLine;
use crate::reservation::ReservationTable;

/// Line-level coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineCoverageStatus {
    Full,
    Partial,
    None,
    /// Stock feed could not answer for this line.
    Unknown,
}

/// Order-level coverage. Kept separate from [`LineCoverageStatus`] even
/// though the labels coincide: the aggregation rules differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCoverageStatus {
    Full,
    Partial,
    None,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCoverage {
    pub row: u32,
    pub status: LineCoverageStatus,
    /// Ledger quantity for the line's stock key; `None` when unknown.
    pub ledger_qty: Option<Quantity>,
    /// Quantity held by other open orders ahead of this one.
    pub contended_qty: Quantity,
    /// `ledger_qty - contended_qty`; `None` when unknown.
    pub available_for_order: Option<Quantity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCoverage {
    pub status: OrderCoverageStatus,
    /// `full_lines / total_lines * 100`, two decimals.
    pub covered_percent: Decimal,
    pub total_lines: usize,
    pub full_lines: usize,
    pub partial_lines: usize,
    pub missing_lines: usize,
    pub unknown_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub order: OrderCoverage,
    pub lines: Vec<LineCoverage>,
}

impl CoverageReport {
    pub fn line(&self, row: u32) -> Option<&LineCoverage> {
        self.lines.iter().find(|l| l.row == row)
    }
}

/// Classify one line given what the ledger said and what others hold.
pub fn line_coverage(row: u32, requested: Quantity, ledger: Option<Quantity>, contended: Quantity) -> LineCoverage {
    let Some(ledger_qty) = ledger else {
        return LineCoverage {
            row,
            status: LineCoverageStatus::Unknown,
            ledger_qty: None,
            contended_qty: contended,
            available_for_order: None,
        };
    };

    let available = ledger_qty - contended;
    let status = if available >= requested {
        LineCoverageStatus::Full
    } else if available > Decimal::ZERO {
        LineCoverageStatus::Partial
    } else {
        LineCoverageStatus::None
    };

    LineCoverage {
        row,
        status,
        ledger_qty: Some(ledger_qty),
        contended_qty: contended,
        available_for_order: Some(available),
    }
}

/// Aggregate line coverage into order coverage.
pub fn order_coverage(lines: &[LineCoverage]) -> OrderCoverage {
    let count = |s: LineCoverageStatus| lines.iter().filter(|l| l.status == s).count();
    let total_lines = lines.len();
    let full_lines = count(LineCoverageStatus::Full);
    let partial_lines = count(LineCoverageStatus::Partial);
    let missing_lines = count(LineCoverageStatus::None);
    let unknown_lines = count(LineCoverageStatus::Unknown);

    let covered_percent = if total_lines == 0 {
        Decimal::ONE_HUNDRED
    } else {
        (Decimal::from(full_lines as u64) * Decimal::ONE_HUNDRED / Decimal::from(total_lines as u64))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };

    let status = if unknown_lines > 0 {
        OrderCoverageStatus::Unknown
    } else if full_lines == total_lines {
        OrderCoverageStatus::Full
    } else if full_lines == 0 && partial_lines == 0 {
        OrderCoverageStatus::None
    } else {
        OrderCoverageStatus::Partial
    };

    OrderCoverage {
        status,
        covered_percent,
        total_lines,
        full_lines,
        partial_lines,
        missing_lines,
        unknown_lines,
    }
}

/// Compute coverage for `order`'s lines.
///
/// A ledger failure degrades the affected lines to UNKNOWN instead of failing
/// the whole computation.
pub fn compute<L>(order: &OrderNumber, lines: &[OrderLine], ledger: &L, reservations: &ReservationTable) -> CoverageReport
where
    L: StockLedger + ?Sized,
{
    let lines: Vec<LineCoverage> = lines
        .iter()
        .map(|line| {
            let key = line.stock_key();
            let on_hand = ledger.available(&key).ok();
            line_coverage(line.row, line.requested_qty, on_hand, reservations.contended(&key, order))
        })
        .collect();

    CoverageReport {
        order: order_coverage(&lines),
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn line_classification_thresholds() {
        assert_eq!(line_coverage(1, dec!(10), Some(dec!(10)), dec!(0)).status, LineCoverageStatus::Full);
        assert_eq!(line_coverage(1, dec!(10), Some(dec!(6)), dec!(0)).status, LineCoverageStatus::Partial);
        assert_eq!(line_coverage(1, dec!(10), Some(dec!(6)), dec!(6)).status, LineCoverageStatus::None);
        assert_eq!(line_coverage(1, dec!(10), Some(dec!(4)), dec!(6)).status, LineCoverageStatus::None);
        assert_eq!(line_coverage(1, dec!(10), None, dec!(6)).status, LineCoverageStatus::Unknown);
    }

    #[test]
    fn available_for_order_subtracts_contention() {
        let c = line_coverage(1, dec!(8), Some(dec!(10)), dec!(8));
        assert_eq!(c.available_for_order, Some(dec!(2)));
        assert_eq!(c.status, LineCoverageStatus::Partial);
    }

    #[test]
    fn order_is_full_only_when_every_line_is_full() {
        let lines = vec![
            line_coverage(1, dec!(1), Some(dec!(5)), dec!(0)),
            line_coverage(2, dec!(10), Some(dec!(5)), dec!(0)),
            line_coverage(3, dec!(1), Some(dec!(0)), dec!(0)),
        ];
        let c = order_coverage(&lines);
        assert_eq!(c.status, OrderCoverageStatus::Partial);
        assert_eq!((c.full_lines, c.partial_lines, c.missing_lines), (1, 1, 1));
        assert_eq!(c.covered_percent, dec!(33.33));
    }

    #[test]
    fn order_with_no_availability_is_none() {
        let lines = vec![line_coverage(1, dec!(1), Some(dec!(0)), dec!(0))];
        assert_eq!(order_coverage(&lines).status, OrderCoverageStatus::None);
    }

    #[test]
    fn any_unknown_line_makes_order_unknown() {
        let lines = vec![
            line_coverage(1, dec!(1), Some(dec!(5)), dec!(0)),
            line_coverage(2, dec!(1), None, dec!(0)),
        ];
        let c = order_coverage(&lines);
        assert_eq!(c.status, OrderCoverageStatus::Unknown);
        assert_eq!(c.unknown_lines, 1);
        assert_eq!(c.covered_percent, dec!(50));
    }

    #[test]
    fn empty_order_is_trivially_full() {
        let c = order_coverage(&[]);
        assert_eq!(c.status, OrderCoverageStatus::Full);
        assert_eq!(c.covered_percent, dec!(100));
    }
}

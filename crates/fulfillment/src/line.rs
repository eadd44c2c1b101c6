//! Order lines and their derived pick status.

use serde::{Deserialize, Serialize};

use depot_core::{Decimal, Quantity};
use depot_stock::{ProductCode, StockKey, WarehouseCode};

/// Optional secondary unit (e.g. boxes for a line counted in pieces).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryUnit {
    pub unit: String,
    /// Primary units per one secondary unit.
    pub factor: Decimal,
}

/// Per-line pick status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineStatus {
    Pending,
    Picked,
    Partial,
    Missing,
    Extra,
}

/// Derive a line's status from its quantities.
///
/// `touched` is set once a picker has explicitly updated the line; a line at
/// zero picked is MISSING after that, PENDING before.
pub fn derive_line_status(requested: Quantity, picked: Quantity, extra: Quantity, touched: bool) -> LineStatus {
    if picked >= requested {
        if extra > Decimal::ZERO {
            LineStatus::Extra
        } else {
            LineStatus::Picked
        }
    } else if picked > Decimal::ZERO {
        LineStatus::Partial
    } else if touched {
        LineStatus::Missing
    } else {
        LineStatus::Pending
    }
}

/// `max(0, requested - picked)`.
pub fn shortage(requested: Quantity, picked: Quantity) -> Quantity {
    (requested - picked).max(Decimal::ZERO)
}

/// Base data for one line as supplied by the order feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineSpec {
    pub row: u32,
    pub product_code: ProductCode,
    pub product_name: String,
    pub warehouse: WarehouseCode,
    pub unit: String,
    pub secondary_unit: Option<SecondaryUnit>,
    pub requested_qty: Quantity,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub shelf_code: Option<String>,
}

/// Order line: feed base data + pick progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub row: u32,
    pub product_code: ProductCode,
    pub product_name: String,
    pub warehouse: WarehouseCode,
    pub unit: String,
    pub secondary_unit: Option<SecondaryUnit>,
    pub requested_qty: Quantity,
    pub picked_qty: Quantity,
    pub extra_qty: Quantity,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub shelf_code: Option<String>,
    pub touched: bool,
}

impl OrderLine {
    pub fn from_spec(spec: &OrderLineSpec) -> Self {
        Self {
            row: spec.row,
            product_code: spec.product_code.clone(),
            product_name: spec.product_name.clone(),
            warehouse: spec.warehouse.clone(),
            unit: spec.unit.clone(),
            secondary_unit: spec.secondary_unit.clone(),
            requested_qty: spec.requested_qty,
            picked_qty: Decimal::ZERO,
            extra_qty: Decimal::ZERO,
            unit_price: spec.unit_price,
            line_total: spec.line_total,
            shelf_code: spec.shelf_code.clone(),
            touched: false,
        }
    }

    /// Re-base a line on fresh feed data, keeping pick progress and any shelf
    /// code the picker recorded.
    pub fn rebase(&self, spec: &OrderLineSpec) -> Self {
        let mut next = Self::from_spec(spec);
        next.picked_qty = self.picked_qty;
        next.extra_qty = self.extra_qty;
        next.touched = self.touched;
        if self.shelf_code.is_some() {
            next.shelf_code = self.shelf_code.clone();
        }
        next
    }

    /// Whether the feed's base data for this line equals `spec`.
    pub fn base_matches(&self, spec: &OrderLineSpec) -> bool {
        self.row == spec.row
            && self.product_code == spec.product_code
            && self.product_name == spec.product_name
            && self.warehouse == spec.warehouse
            && self.unit == spec.unit
            && self.secondary_unit == spec.secondary_unit
            && self.requested_qty == spec.requested_qty
            && self.unit_price == spec.unit_price
            && self.line_total == spec.line_total
    }

    pub fn stock_key(&self) -> StockKey {
        StockKey::new(self.product_code.clone(), self.warehouse.clone())
    }

    pub fn status(&self) -> LineStatus {
        derive_line_status(self.requested_qty, self.picked_qty, self.extra_qty, self.touched)
    }

    pub fn shortage_qty(&self) -> Quantity {
        shortage(self.requested_qty, self.picked_qty)
    }

    pub fn is_fully_picked(&self) -> bool {
        self.picked_qty >= self.requested_qty
    }

    /// Requested quantity expressed in the secondary unit, if any.
    pub fn requested_in_secondary(&self) -> Option<Quantity> {
        self.secondary_unit
            .as_ref()
            .filter(|s| !s.factor.is_zero())
            .map(|s| (self.requested_qty / s.factor).round_dp(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn spec() -> OrderLineSpec {
        OrderLineSpec {
            row: 1,
            product_code: ProductCode::new("P1").unwrap(),
            product_name: "Bolt M8".into(),
            warehouse: WarehouseCode::new("W1").unwrap(),
            unit: "PCS".into(),
            secondary_unit: Some(SecondaryUnit {
                unit: "BOX".into(),
                factor: dec!(12),
            }),
            requested_qty: dec!(24),
            unit_price: dec!(1.5),
            line_total: dec!(36),
            shelf_code: Some("A-01".into()),
        }
    }

    #[test]
    fn status_follows_pick_quantities() {
        assert_eq!(derive_line_status(dec!(10), dec!(0), dec!(0), false), LineStatus::Pending);
        assert_eq!(derive_line_status(dec!(10), dec!(0), dec!(0), true), LineStatus::Missing);
        assert_eq!(derive_line_status(dec!(10), dec!(6), dec!(0), true), LineStatus::Partial);
        assert_eq!(derive_line_status(dec!(10), dec!(10), dec!(0), true), LineStatus::Picked);
        assert_eq!(derive_line_status(dec!(10), dec!(12), dec!(2), true), LineStatus::Extra);
    }

    #[test]
    fn rebase_keeps_progress_and_picker_shelf() {
        let mut line = OrderLine::from_spec(&spec());
        line.picked_qty = dec!(5);
        line.touched = true;
        line.shelf_code = Some("B-07".into());

        let mut fresh = spec();
        fresh.requested_qty = dec!(30);
        fresh.shelf_code = Some("A-02".into());

        let rebased = line.rebase(&fresh);
        assert_eq!(rebased.requested_qty, dec!(30));
        assert_eq!(rebased.picked_qty, dec!(5));
        assert_eq!(rebased.shelf_code.as_deref(), Some("B-07"));
        assert!(rebased.base_matches(&fresh));
        assert!(!line.base_matches(&fresh));
    }

    #[test]
    fn requested_in_secondary_unit() {
        let line = OrderLine::from_spec(&spec());
        assert_eq!(line.requested_in_secondary(), Some(dec!(2)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: shortage and status agree with the pick arithmetic.
        #[test]
        fn shortage_and_status_agree(
            requested in 0i64..1_000,
            picked in 0i64..1_200,
            extra in 0i64..50,
            touched in any::<bool>(),
        ) {
            let (r, p, e) = (Decimal::from(requested), Decimal::from(picked), Decimal::from(extra));
            let s = shortage(r, p);
            prop_assert_eq!(s, Decimal::from((requested - picked).max(0)));

            let status = derive_line_status(r, p, e, touched);
            match status {
                LineStatus::Picked => prop_assert!(p >= r && e.is_zero()),
                LineStatus::Extra => prop_assert!(p >= r && e > Decimal::ZERO),
                LineStatus::Partial => prop_assert!(p > Decimal::ZERO && p < r),
                LineStatus::Pending | LineStatus::Missing => prop_assert!(p.is_zero() && r > Decimal::ZERO),
            }
        }
    }
}

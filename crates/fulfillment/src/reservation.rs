//! Reservation Table: cross-order claims on stock lines.
//!
//! Claims live in an arena keyed by a monotonically increasing sequence
//! (creation order), with secondary indexes by stock key, by order and by
//! (order, row, key). The sequence is the fairness order: an order only sees
//! claims created before its own as contention.
//!
//! Claims are advisory. They are sized against the ledger at write time and
//! never block a pick; when the ledger shrinks the latest claims give way
//! first. Coverage is recomputed from them on every read.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use depot_core::{Decimal, OrderNumber, Quantity};
use depot_stock::StockKey;

/// One order line's hold on a stock line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub seq: u64,
    pub order: OrderNumber,
    pub row: u32,
    pub key: StockKey,
    pub quantity: Quantity,
}

/// A claim as seen from one order's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimView {
    pub order: OrderNumber,
    pub row: u32,
    pub quantity: Quantity,
    pub is_own: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LineRef {
    order: OrderNumber,
    row: u32,
    key: StockKey,
}

#[derive(Debug, Clone, Default)]
pub struct ReservationTable {
    next_seq: u64,
    arena: BTreeMap<u64, Claim>,
    by_key: HashMap<StockKey, BTreeSet<u64>>,
    by_order: HashMap<OrderNumber, BTreeSet<u64>>,
    by_line: HashMap<LineRef, u64>,
}

impl ReservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    fn claims_on_key<'a>(&'a self, key: &StockKey) -> impl Iterator<Item = &'a Claim> + 'a {
        self.by_key
            .get(key)
            .into_iter()
            .flat_map(|seqs| seqs.iter())
            .filter_map(|seq| self.arena.get(seq))
    }

    /// Create or refresh the claim for one order line.
    ///
    /// The claim is sized `min(requested, ledger - claims created before it)`,
    /// floored at zero; a new claim queues behind every existing one. Claims
    /// created after it are then trimmed to fit the ledger (see
    /// [`fit_to_ledger`](Self::fit_to_ledger)). A zero-sized claim is dropped.
    /// An existing claim keeps its position in the fairness order.
    /// `ledger = None` means the stock feed could not answer: the existing
    /// claim is left untouched and no new claim is created.
    ///
    /// Returns the claimed quantity after the call.
    pub fn upsert(
        &mut self,
        order: &OrderNumber,
        row: u32,
        key: &StockKey,
        requested: Quantity,
        ledger: Option<Quantity>,
    ) -> Option<Quantity> {
        let line = LineRef {
            order: order.clone(),
            row,
            key: key.clone(),
        };
        let existing = self.by_line.get(&line).copied();

        let Some(ledger) = ledger else {
            return existing.and_then(|seq| self.arena.get(&seq)).map(|c| c.quantity);
        };

        let ahead: Quantity = self
            .claims_on_key(key)
            .filter(|c| existing.is_none_or(|own| c.seq < own))
            .map(|c| c.quantity)
            .sum();
        let size = requested.min(ledger - ahead).max(Decimal::ZERO);

        let seq = match existing {
            Some(seq) => {
                if let Some(claim) = self.arena.get_mut(&seq) {
                    claim.quantity = size;
                }
                seq
            }
            None if size.is_zero() => {
                self.fit_to_ledger(key, ledger);
                return None;
            }
            None => {
                self.next_seq += 1;
                let seq = self.next_seq;
                self.arena.insert(
                    seq,
                    Claim {
                        seq,
                        order: order.clone(),
                        row,
                        key: key.clone(),
                        quantity: size,
                    },
                );
                self.by_key.entry(key.clone()).or_default().insert(seq);
                self.by_order.entry(order.clone()).or_default().insert(seq);
                self.by_line.insert(line, seq);
                seq
            }
        };

        self.fit_to_ledger(key, ledger);
        self.arena.get(&seq).map(|c| c.quantity)
    }

    /// Trim the claims on `key` in creation order so their sum fits `ledger`.
    /// Earlier claims keep as much as the ledger allows; claims trimmed to
    /// zero are dropped. Returns how many claims changed.
    pub fn fit_to_ledger(&mut self, key: &StockKey, ledger: Quantity) -> usize {
        let mut room = ledger.max(Decimal::ZERO);
        let mut emptied = Vec::new();
        let mut changed = 0;
        let seqs: Vec<u64> = self.by_key.get(key).map(|s| s.iter().copied().collect()).unwrap_or_default();
        for seq in seqs {
            let Some(claim) = self.arena.get_mut(&seq) else {
                continue;
            };
            if claim.quantity > room {
                claim.quantity = room;
                changed += 1;
            }
            if claim.quantity.is_zero() {
                emptied.push(seq);
            }
            room -= claim.quantity;
        }
        for seq in emptied {
            self.remove(seq);
        }
        changed
    }

    fn remove(&mut self, seq: u64) -> Option<Claim> {
        let claim = self.arena.remove(&seq)?;
        if let Some(seqs) = self.by_key.get_mut(&claim.key) {
            seqs.remove(&seq);
            if seqs.is_empty() {
                self.by_key.remove(&claim.key);
            }
        }
        if let Some(seqs) = self.by_order.get_mut(&claim.order) {
            seqs.remove(&seq);
            if seqs.is_empty() {
                self.by_order.remove(&claim.order);
            }
        }
        self.by_line.remove(&LineRef {
            order: claim.order.clone(),
            row: claim.row,
            key: claim.key.clone(),
        });
        Some(claim)
    }

    /// Drop every claim of `order` that does not belong to one of `lines`
    /// (row + stock key). Used after a feed resend reshapes the order.
    pub fn retain_lines(&mut self, order: &OrderNumber, lines: &[(u32, StockKey)]) -> usize {
        let stale: Vec<u64> = self
            .claims_for_order(order)
            .into_iter()
            .filter(|c| !lines.iter().any(|(row, key)| *row == c.row && *key == c.key))
            .map(|c| c.seq)
            .collect();
        for seq in &stale {
            self.remove(*seq);
        }
        stale.len()
    }

    /// Release all claims held by `order`.
    pub fn release_order(&mut self, order: &OrderNumber) -> Vec<Claim> {
        let seqs: Vec<u64> = self
            .by_order
            .get(order)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        seqs.into_iter().filter_map(|seq| self.remove(seq)).collect()
    }

    /// Quantity on `key` held by other orders ahead of `order`.
    ///
    /// If `order` holds a claim on `key`, only other orders' claims created
    /// before it count; otherwise every other order's claim counts.
    pub fn contended(&self, key: &StockKey, order: &OrderNumber) -> Quantity {
        let own_first = self
            .claims_on_key(key)
            .filter(|c| &c.order == order)
            .map(|c| c.seq)
            .min();
        self.claims_on_key(key)
            .filter(|c| &c.order != order)
            .filter(|c| own_first.is_none_or(|own| c.seq < own))
            .map(|c| c.quantity)
            .sum()
    }

    pub fn total_claimed(&self, key: &StockKey) -> Quantity {
        self.claims_on_key(key).map(|c| c.quantity).sum()
    }

    /// All claims on `key` in creation order, flagged relative to `viewer`.
    pub fn claims_on(&self, key: &StockKey, viewer: &OrderNumber) -> Vec<ClaimView> {
        self.claims_on_key(key)
            .map(|c| ClaimView {
                order: c.order.clone(),
                row: c.row,
                quantity: c.quantity,
                is_own: &c.order == viewer,
            })
            .collect()
    }

    pub fn claims_for_order(&self, order: &OrderNumber) -> Vec<Claim> {
        self.by_order
            .get(order)
            .into_iter()
            .flat_map(|seqs| seqs.iter())
            .filter_map(|seq| self.arena.get(seq).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_stock::{ProductCode, WarehouseCode};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn key(p: &str, w: &str) -> StockKey {
        StockKey::new(ProductCode::new(p).unwrap(), WarehouseCode::new(w).unwrap())
    }

    fn order(s: &str) -> OrderNumber {
        s.parse().unwrap()
    }

    #[test]
    fn first_claim_wins_contested_quantity() {
        let mut table = ReservationTable::new();
        let k = key("P2", "W2");
        let (a, b) = (order("A-2001"), order("A-2002"));

        assert_eq!(table.upsert(&a, 1, &k, dec!(8), Some(dec!(10))), Some(dec!(8)));
        assert_eq!(table.upsert(&b, 1, &k, dec!(8), Some(dec!(10))), Some(dec!(2)));

        assert_eq!(table.contended(&k, &a), dec!(0));
        assert_eq!(table.contended(&k, &b), dec!(8));
        assert_eq!(table.total_claimed(&k), dec!(10));
    }

    #[test]
    fn order_without_claim_sees_all_other_claims() {
        let mut table = ReservationTable::new();
        let k = key("P1", "W1");
        table.upsert(&order("A-1"), 1, &k, dec!(3), Some(dec!(10)));
        table.upsert(&order("A-2"), 1, &k, dec!(4), Some(dec!(10)));
        assert_eq!(table.contended(&k, &order("A-3")), dec!(7));
    }

    #[test]
    fn refresh_is_idempotent_and_keeps_position() {
        let mut table = ReservationTable::new();
        let k = key("P1", "W1");
        let a = order("A-1");
        table.upsert(&a, 1, &k, dec!(5), Some(dec!(10)));
        table.upsert(&order("A-2"), 1, &k, dec!(5), Some(dec!(10)));

        assert_eq!(table.upsert(&a, 1, &k, dec!(5), Some(dec!(10))), Some(dec!(5)));
        assert_eq!(table.len(), 2);
        assert_eq!(table.contended(&k, &a), dec!(0));
    }

    #[test]
    fn unknown_ledger_keeps_existing_claim_and_creates_none() {
        let mut table = ReservationTable::new();
        let k = key("P1", "W1");
        table.upsert(&order("A-1"), 1, &k, dec!(5), Some(dec!(10)));

        assert_eq!(table.upsert(&order("A-1"), 1, &k, dec!(9), None), Some(dec!(5)));
        assert_eq!(table.upsert(&order("A-2"), 1, &k, dec!(9), None), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn zero_availability_drops_claim() {
        let mut table = ReservationTable::new();
        let k = key("P1", "W1");
        let a = order("A-1");
        table.upsert(&a, 1, &k, dec!(5), Some(dec!(10)));
        assert_eq!(table.upsert(&a, 1, &k, dec!(5), Some(dec!(0))), None);
        assert!(table.is_empty());
    }

    #[test]
    fn release_order_removes_every_index_entry() {
        let mut table = ReservationTable::new();
        let a = order("A-1");
        table.upsert(&a, 1, &key("P1", "W1"), dec!(2), Some(dec!(10)));
        table.upsert(&a, 2, &key("P2", "W1"), dec!(2), Some(dec!(10)));
        table.upsert(&order("A-2"), 1, &key("P1", "W1"), dec!(2), Some(dec!(10)));

        let released = table.release_order(&a);
        assert_eq!(released.len(), 2);
        assert!(table.claims_for_order(&a).is_empty());
        assert_eq!(table.total_claimed(&key("P1", "W1")), dec!(2));
        assert_eq!(table.total_claimed(&key("P2", "W1")), dec!(0));
    }

    #[test]
    fn retain_lines_drops_vanished_rows() {
        let mut table = ReservationTable::new();
        let a = order("A-1");
        table.upsert(&a, 1, &key("P1", "W1"), dec!(2), Some(dec!(10)));
        table.upsert(&a, 2, &key("P2", "W1"), dec!(2), Some(dec!(10)));

        let removed = table.retain_lines(&a, &[(1, key("P1", "W1"))]);
        assert_eq!(removed, 1);
        assert_eq!(table.claims_for_order(&a).len(), 1);
    }

    #[test]
    fn claims_on_flags_own_claims() {
        let mut table = ReservationTable::new();
        let k = key("P1", "W1");
        table.upsert(&order("A-1"), 1, &k, dec!(2), Some(dec!(10)));
        table.upsert(&order("A-2"), 3, &k, dec!(2), Some(dec!(10)));

        let views = table.claims_on(&k, &order("A-2"));
        assert_eq!(views.len(), 2);
        assert!(!views[0].is_own);
        assert!(views[1].is_own);
        assert_eq!(views[1].row, 3);
    }

    #[test]
    fn shrinking_ledger_is_taken_from_the_latest_claim() {
        let mut table = ReservationTable::new();
        let k = key("P2", "W2");
        let (a, b) = (order("A-2001"), order("A-2002"));
        table.upsert(&a, 1, &k, dec!(8), Some(dec!(10)));
        table.upsert(&b, 1, &k, dec!(8), Some(dec!(10)));

        assert_eq!(table.upsert(&a, 1, &k, dec!(8), Some(dec!(8))), Some(dec!(8)));
        assert!(table.claims_for_order(&b).is_empty());
        assert_eq!(table.total_claimed(&k), dec!(8));
        assert_eq!(table.contended(&k, &a), dec!(0));
    }

    #[test]
    fn later_refresh_trims_earlier_claims_only_past_the_ledger() {
        let mut table = ReservationTable::new();
        let k = key("P1", "W1");
        let (a, b, c) = (order("A-1"), order("A-2"), order("A-3"));
        table.upsert(&a, 1, &k, dec!(4), Some(dec!(10)));
        table.upsert(&b, 1, &k, dec!(4), Some(dec!(10)));
        table.upsert(&c, 1, &k, dec!(4), Some(dec!(10)));

        assert_eq!(table.upsert(&c, 1, &k, dec!(4), Some(dec!(6))), None);
        assert_eq!(table.claims_for_order(&a)[0].quantity, dec!(4));
        assert_eq!(table.claims_for_order(&b)[0].quantity, dec!(2));
        assert_eq!(table.contended(&k, &b), dec!(4));
    }

    #[test]
    fn grown_ledger_lets_a_trimmed_claim_regrow_on_refresh() {
        let mut table = ReservationTable::new();
        let k = key("P1", "W1");
        let (a, b) = (order("A-1"), order("A-2"));
        table.upsert(&a, 1, &k, dec!(5), Some(dec!(10)));
        table.upsert(&b, 1, &k, dec!(5), Some(dec!(10)));
        assert_eq!(table.fit_to_ledger(&k, dec!(7)), 1);

        assert_eq!(table.upsert(&b, 1, &k, dec!(5), Some(dec!(12))), Some(dec!(5)));
        assert_eq!(table.contended(&k, &b), dec!(5));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: against a fixed ledger, the sum of claims never exceeds it.
        #[test]
        fn claims_never_exceed_ledger(
            ledger in 0i64..50,
            ops in prop::collection::vec((0u64..4, 1u32..4, 0i64..30), 1..40),
        ) {
            let mut table = ReservationTable::new();
            let k = key("P", "W");
            let ledger = Decimal::from(ledger);

            for (o, row, requested) in ops {
                let number = OrderNumber::new("A", o).unwrap();
                table.upsert(&number, row, &k, Decimal::from(requested), Some(ledger));
                prop_assert!(table.total_claimed(&k) <= ledger);
            }
        }

        /// Property: while the ledger moves between refreshes, the sum of
        /// claims stays within the latest ledger, and the earliest claimant
        /// holds exactly what it would hold with no other claimant.
        #[test]
        fn earliest_claim_ignores_later_claimants(
            first in (1i64..20, 1i64..30),
            ops in prop::collection::vec((0u64..4, 1u32..3, 1i64..20, 1i64..30), 1..40),
        ) {
            let mut shared = ReservationTable::new();
            let mut alone = ReservationTable::new();
            let k = key("P", "W");
            let lead = OrderNumber::new("A", 0).unwrap();

            let (requested, ledger) = (Decimal::from(first.0), Decimal::from(first.1));
            shared.upsert(&lead, 1, &k, requested, Some(ledger));
            alone.upsert(&lead, 1, &k, requested, Some(ledger));

            for (o, row, requested, ledger) in ops {
                let (requested, ledger) = (Decimal::from(requested), Decimal::from(ledger));
                if o == 0 {
                    shared.upsert(&lead, 1, &k, requested, Some(ledger));
                    alone.upsert(&lead, 1, &k, requested, Some(ledger));
                } else {
                    let number = OrderNumber::new("A", o).unwrap();
                    shared.upsert(&number, row, &k, requested, Some(ledger));
                    alone.fit_to_ledger(&k, ledger);
                }
                prop_assert!(shared.total_claimed(&k) <= ledger);
                prop_assert_eq!(shared.claims_for_order(&lead), alone.claims_for_order(&lead));
            }
        }
    }
}

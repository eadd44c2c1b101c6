use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use depot_core::Quantity;

use crate::ledger::{ProductCode, StockError, StockKey, StockLedger, StockLevel};

/// In-memory ledger written by the inventory feed and read by the engine.
///
/// Holds the last reported on-hand quantity per (product, warehouse). While
/// the feed is marked offline every read fails with `Unavailable`, so callers
/// can tell stale data apart from zero stock.
#[derive(Debug)]
pub struct FeedLedger {
    levels: RwLock<BTreeMap<StockKey, Quantity>>,
    online: AtomicBool,
}

impl Default for FeedLedger {
    fn default() -> Self {
        Self {
            levels: RwLock::new(BTreeMap::new()),
            online: AtomicBool::new(true),
        }
    }
}

impl FeedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the on-hand quantity for each entry. Negative feed values are
    /// stored as zero.
    pub fn record(&self, entries: impl IntoIterator<Item = (StockKey, Quantity)>) -> Result<usize, StockError> {
        let mut levels = self
            .levels
            .write()
            .map_err(|_| StockError::Unavailable("stock ledger lock poisoned".to_string()))?;

        let mut written = 0;
        for (key, quantity) in entries {
            levels.insert(key, quantity.max(Quantity::ZERO));
            written += 1;
        }
        Ok(written)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<(), StockError> {
        if self.is_online() {
            Ok(())
        } else {
            Err(StockError::Unavailable("inventory feed is offline".to_string()))
        }
    }
}

impl StockLedger for FeedLedger {
    fn available(&self, key: &StockKey) -> Result<Quantity, StockError> {
        self.ensure_online()?;
        let levels = self
            .levels
            .read()
            .map_err(|_| StockError::Unavailable("stock ledger lock poisoned".to_string()))?;
        Ok(levels.get(key).copied().unwrap_or(Quantity::ZERO))
    }

    fn levels(&self, product: &ProductCode) -> Result<Vec<StockLevel>, StockError> {
        self.ensure_online()?;
        let levels = self
            .levels
            .read()
            .map_err(|_| StockError::Unavailable("stock ledger lock poisoned".to_string()))?;
        Ok(levels
            .iter()
            .filter(|(key, _)| &key.product == product)
            .map(|(key, quantity)| StockLevel {
                warehouse: key.warehouse.clone(),
                quantity: *quantity,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::WarehouseCode;

    fn key(product: &str, warehouse: &str) -> StockKey {
        StockKey::new(ProductCode::new(product).unwrap(), WarehouseCode::new(warehouse).unwrap())
    }

    #[test]
    fn unknown_key_reads_as_zero() {
        let ledger = FeedLedger::new();
        assert_eq!(ledger.available(&key("P1", "W1")).unwrap(), Quantity::ZERO);
    }

    #[test]
    fn record_overwrites_and_clamps() {
        let ledger = FeedLedger::new();
        ledger
            .record([(key("P1", "W1"), Quantity::from(6)), (key("P1", "W2"), Quantity::from(-3))])
            .unwrap();
        ledger.record([(key("P1", "W1"), Quantity::from(4))]).unwrap();

        assert_eq!(ledger.available(&key("P1", "W1")).unwrap(), Quantity::from(4));
        let levels = ledger.levels(&ProductCode::new("P1").unwrap()).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1].quantity, Quantity::ZERO);
    }

    #[test]
    fn offline_feed_is_distinguishable_from_no_stock() {
        let ledger = FeedLedger::new();
        ledger.set_online(false);
        assert!(matches!(
            ledger.available(&key("P1", "W1")),
            Err(StockError::Unavailable(_))
        ));
        ledger.set_online(true);
        assert!(ledger.available(&key("P1", "W1")).is_ok());
    }
}

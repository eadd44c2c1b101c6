//! Per-order mutual exclusion.
//!
//! Every state-changing call on one order runs under that order's lock, so
//! `start`, `updateLine`, `markLoaded` and `dispatch` on the same order never
//! interleave. Calls on different orders proceed in parallel. An order's
//! entry is dropped as soon as no call holds or waits for it, so the table
//! only ever holds orders with calls in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use depot_core::OrderNumber;

use crate::event_store::EventStoreError;

#[derive(Debug, Default)]
pub struct OrderLocks {
    locks: Mutex<HashMap<OrderNumber, Arc<Mutex<()>>>>,
}

impl OrderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> Result<MutexGuard<'_, HashMap<OrderNumber, Arc<Mutex<()>>>>, EventStoreError> {
        self.locks
            .lock()
            .map_err(|_| EventStoreError::Unavailable("order lock table poisoned".to_string()))
    }

    /// Run `f` while holding the lock for `number`.
    pub fn with_lock<T>(&self, number: &OrderNumber, f: impl FnOnce() -> T) -> Result<T, EventStoreError> {
        let handle = self.table()?.entry(number.clone()).or_default().clone();
        let out = {
            let _guard = handle
                .lock()
                .map_err(|_| EventStoreError::Unavailable(format!("lock for order {number} poisoned")))?;
            f()
        };

        let mut table = self.table()?;
        // Only the table and this call still reference the entry.
        if Arc::strong_count(&handle) == 2 {
            table.remove(number);
        }
        Ok(out)
    }

    /// Orders with a call in flight.
    pub fn in_flight(&self) -> usize {
        self.table().map(|t| t.len()).unwrap_or(0)
    }
}

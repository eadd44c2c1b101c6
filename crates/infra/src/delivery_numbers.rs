use std::collections::HashMap;
use std::sync::Mutex;

use depot_dispatch::DeliveryNoteRef;

use crate::event_store::EventStoreError;

/// Delivery-note numbers: one counter per upper-cased series, starting at 1.
///
/// A number is only consumed when the caller's commit succeeds, so rejected
/// or lost dispatches leave no gaps.
#[derive(Debug, Default)]
pub struct DeliveryNumbers {
    issued: Mutex<HashMap<String, u64>>,
}

impl DeliveryNumbers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand the next number of `series` to `commit`; it counts as issued only
    /// if `commit` returns `Ok`. Commits on the same allocator run one at a time.
    pub fn issue<T, E>(&self, series: &str, commit: impl FnOnce(DeliveryNoteRef) -> Result<T, E>) -> Result<T, E>
    where
        E: From<EventStoreError>,
    {
        let series = series.trim().to_uppercase();
        let mut issued = self
            .issued
            .lock()
            .map_err(|_| EventStoreError::Unavailable("delivery number counter poisoned".to_string()))?;
        let number = issued.get(&series).copied().unwrap_or(0) + 1;
        let out = commit(DeliveryNoteRef {
            series: series.clone(),
            number,
        })?;
        issued.insert(series, number);
        Ok(out)
    }

    /// Record a note that was issued before this allocator existed, so the
    /// series continues after it.
    pub fn observe(&self, note: &DeliveryNoteRef) -> Result<(), EventStoreError> {
        let mut issued = self
            .issued
            .lock()
            .map_err(|_| EventStoreError::Unavailable("delivery number counter poisoned".to_string()))?;
        let last = issued.entry(note.series.trim().to_uppercase()).or_insert(0);
        *last = (*last).max(note.number);
        Ok(())
    }
}

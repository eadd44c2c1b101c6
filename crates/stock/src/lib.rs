//! Stock Ledger View.
//!
//! Read-only port onto per-warehouse on-hand quantities supplied by an
//! external, eventually-consistent inventory feed. The engine never writes
//! through the `StockLedger` contract; `FeedLedger` is the feed-side
//! implementation used when no external ledger is wired in.

pub mod feed;
pub mod ledger;

pub use feed::FeedLedger;
pub use ledger::{ProductCode, StockError, StockKey, StockLedger, StockLevel, WarehouseCode};

//! Image Issue Reporter.
//!
//! Append-mostly ledger of product-image problems flagged by pickers. Reports
//! reference an order line and a product but have their own lifecycle, fully
//! decoupled from fulfillment state.

pub mod report;

pub use report::{ImageIssueReport, IssueFilter, IssueNote, IssueStatus, find_open};

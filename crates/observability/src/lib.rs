//! Process-wide logging setup shared by the binaries.

/// Subscriber construction from `LogConfig`.
pub mod tracing;

pub use self::tracing::init;

//! Domain error model.

use thiserror::Error;

/// Domain-level error.
///
/// Deterministic business failures only. Storage concerns live in the infra
/// crate. Every variant carries enough context for a caller to render a
/// user-facing message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (negative quantity, missing transport field,
    /// inactive driver/vehicle).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Unknown order, line, driver, vehicle or report.
    #[error("not found: {0}")]
    NotFound(String),

    /// The workflow state machine does not permit the requested transition.
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },

    /// Order already claimed by another picker, or a concurrent update lost
    /// the race.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An upstream feed (stock ledger) could not be reached.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn illegal_transition(from: impl core::fmt::Display, to: impl core::fmt::Display) -> Self {
        Self::IllegalTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn upstream_unavailable(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn illegal_transition_names_both_states() {
        let err = DomainError::illegal_transition("PENDING", "DISPATCHED");
        assert_eq!(
            err.to_string(),
            "illegal transition from PENDING to DISPATCHED"
        );
    }
}

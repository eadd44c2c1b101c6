//! Event-sourced aggregate contract.

/// Identity and revision of an event-sourced record.
pub trait AggregateRoot {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Number of events applied so far; equals the stream revision.
    fn version(&self) -> u64;
}

/// What the writer believes the stream revision to be at append time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Append unconditionally.
    Any,
    /// The stream must not exist yet (first sync of an order).
    NoStream,
    /// The stream must be at exactly this revision.
    Exact(u64),
}

impl ExpectedVersion {
    /// Expectation for a writer that loaded `revision` events.
    pub fn after(revision: u64) -> Self {
        if revision == 0 {
            ExpectedVersion::NoStream
        } else {
            ExpectedVersion::Exact(revision)
        }
    }

    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::NoStream => actual == 0,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}

/// Decide/evolve split for an aggregate.
///
/// `handle` inspects state and returns the events a command produces without
/// mutating anything; `apply` folds one event into state and bumps the
/// version. Neither may do IO: stock levels and catalog entries are resolved
/// by the caller and carried in the command.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    fn apply(&mut self, event: &Self::Event);

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expectation_after_load() {
        assert_eq!(ExpectedVersion::after(0), ExpectedVersion::NoStream);
        assert_eq!(ExpectedVersion::after(4), ExpectedVersion::Exact(4));
        assert!(ExpectedVersion::NoStream.matches(0));
        assert!(!ExpectedVersion::NoStream.matches(1));
        assert!(!ExpectedVersion::Exact(2).matches(3));
        assert!(ExpectedVersion::Any.matches(42));
    }
}

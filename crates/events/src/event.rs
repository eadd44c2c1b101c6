use chrono::{DateTime, Utc};

/// A fact recorded on exactly one stream.
///
/// Events are never edited once appended. A change to the serialized shape
/// bumps `version` so stored payloads stay readable.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted `<aggregate>.<fact>` name, e.g. `fulfillment.order.dispatched`.
    fn event_type(&self) -> &'static str;

    /// Payload schema version.
    fn version(&self) -> u32 {
        1
    }

    /// Business time of the fact.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Natural key of the owning stream (`A-1001` for an order).
    fn stream_id(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Counted {
        bin: &'static str,
        at: DateTime<Utc>,
    }

    impl Event for Counted {
        fn event_type(&self) -> &'static str {
            "cycle_count.counted"
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.at
        }

        fn stream_id(&self) -> String {
            self.bin.to_string()
        }
    }

    #[test]
    fn version_defaults_to_one() {
        let ev = Counted { bin: "B-12", at: Utc::now() };
        assert_eq!(ev.version(), 1);
        assert_eq!(ev.stream_id(), "B-12");
    }
}

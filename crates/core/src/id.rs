//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a driver in the dispatch catalog.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(Uuid);

/// Identifier of a vehicle in the dispatch catalog.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(Uuid);

/// Identifier of an image issue report.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

impl_uuid_newtype!(DriverId, "DriverId");
impl_uuid_newtype!(VehicleId, "VehicleId");
impl_uuid_newtype!(ReportId, "ReportId");

/// ERP order number: document series + sequence (e.g. `A-1001`).
///
/// Natural key of an order fulfillment record. Parsing splits on the last
/// `-`, so series may themselves contain dashes (`WEB-B-17`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber {
    series: String,
    sequence: u64,
}

impl OrderNumber {
    pub fn new(series: impl Into<String>, sequence: u64) -> Result<Self, DomainError> {
        let series = series.into().trim().to_uppercase();
        if series.is_empty() {
            return Err(DomainError::invalid_id("OrderNumber: series cannot be empty"));
        }
        Ok(Self { series, sequence })
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl core::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}", self.series, self.sequence)
    }
}

impl FromStr for OrderNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (series, sequence) = s
            .trim()
            .rsplit_once('-')
            .ok_or_else(|| DomainError::invalid_id(format!("OrderNumber: '{s}' has no series")))?;
        let sequence = sequence
            .parse::<u64>()
            .map_err(|e| DomainError::invalid_id(format!("OrderNumber: '{s}': {e}")))?;
        Self::new(series, sequence)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderNumber> for String {
    fn from(value: OrderNumber) -> Self {
        value.to_string()
    }
}

/// Identity of the picker who claimed an order.
///
/// Opaque to this engine: user accounts live in the portal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PickerId(String);

impl PickerId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(DomainError::validation("picker id cannot be empty"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PickerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PickerId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PickerId> for String {
    fn from(value: PickerId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_parses_series_and_sequence() {
        let n: OrderNumber = "a-1001".parse().unwrap();
        assert_eq!(n.series(), "A");
        assert_eq!(n.sequence(), 1001);
        assert_eq!(n.to_string(), "A-1001");
    }

    #[test]
    fn order_number_series_may_contain_dashes() {
        let n: OrderNumber = "WEB-B-17".parse().unwrap();
        assert_eq!(n.series(), "WEB-B");
        assert_eq!(n.sequence(), 17);
    }

    #[test]
    fn order_number_rejects_malformed_input() {
        assert!(matches!("1001".parse::<OrderNumber>(), Err(DomainError::InvalidId(_))));
        assert!(matches!("A-x".parse::<OrderNumber>(), Err(DomainError::InvalidId(_))));
        assert!(matches!("-5".parse::<OrderNumber>(), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn order_number_round_trips_through_string() {
        let n = OrderNumber::new(" b ", 7).unwrap();
        assert_eq!(String::from(n.clone()), "B-7");
        assert_eq!(OrderNumber::try_from("B-7".to_string()).unwrap(), n);
    }

    #[test]
    fn picker_id_cannot_be_blank() {
        assert!(PickerId::new("  ").is_err());
        assert_eq!(PickerId::new(" ayse ").unwrap().as_str(), "ayse");
    }
}

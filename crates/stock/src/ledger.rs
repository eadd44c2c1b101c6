use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use depot_core::{DomainError, Quantity};

/// ERP product (stock) code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProductCode(String);

/// ERP warehouse (depot) code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WarehouseCode(String);

macro_rules! impl_code_newtype {
    ($t:ident, $name:literal) => {
        impl $t {
            pub fn new(code: impl Into<String>) -> Result<Self, DomainError> {
                let code = code.into().trim().to_string();
                if code.is_empty() {
                    return Err(DomainError::validation(concat!($name, " cannot be empty")));
                }
                Ok(Self(code))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_code_newtype!(ProductCode, "product code");
impl_code_newtype!(WarehouseCode, "warehouse code");

/// Key of one stock line: a product held in one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockKey {
    pub product: ProductCode,
    pub warehouse: WarehouseCode,
}

impl StockKey {
    pub fn new(product: ProductCode, warehouse: WarehouseCode) -> Self {
        Self { product, warehouse }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.product, self.warehouse)
    }
}

/// On-hand quantity of a product in one warehouse, as last reported by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub warehouse: WarehouseCode,
    pub quantity: Quantity,
}

/// Stock lookup failure.
///
/// Distinguishes "the feed cannot answer" from "there is no stock": an
/// unknown key is `Ok(0)`, never an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    #[error("stock feed unavailable: {0}")]
    Unavailable(String),
}

impl From<StockError> for DomainError {
    fn from(value: StockError) -> Self {
        match value {
            StockError::Unavailable(msg) => DomainError::upstream_unavailable(msg),
        }
    }
}

/// Read-only stock ledger contract.
pub trait StockLedger: Send + Sync {
    /// Quantity available for `key`; zero when the feed has no entry.
    fn available(&self, key: &StockKey) -> Result<Quantity, StockError>;

    /// Per-warehouse snapshot of a product, ordered by warehouse code.
    fn levels(&self, product: &ProductCode) -> Result<Vec<StockLevel>, StockError>;
}

impl<S> StockLedger for Arc<S>
where
    S: StockLedger + ?Sized,
{
    fn available(&self, key: &StockKey) -> Result<Quantity, StockError> {
        (**self).available(key)
    }

    fn levels(&self, product: &ProductCode) -> Result<Vec<StockLevel>, StockError> {
        (**self).levels(product)
    }
}

//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default low-stock alert level when none is supplied
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Sellable item with its stock counter
///
/// `current_stock` is written only by the inventory ledger; every change is
/// paired with one [`LedgerEntry`](super::LedgerEntry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    /// Category name (validated against the catalog)
    pub category: String,
    pub current_stock: i64,
    pub low_stock_threshold: i64,
    pub available: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Product {
    /// Stock at or below the alert level
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.low_stock_threshold
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
    pub category: String,
    #[serde(default)]
    pub current_stock: i64,
    pub low_stock_threshold: Option<i64>,
    pub available: Option<bool>,
    /// Ledger note for the INITIAL_SETUP entry
    pub note: Option<String>,
}

/// Update product payload (omitted fields keep their value)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub current_stock: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub available: Option<bool>,
    /// Ledger note for the UPDATE entry
    pub note: Option<String>,
}

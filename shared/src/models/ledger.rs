//! Inventory ledger entries

use serde::{Deserialize, Serialize};
use std::fmt;

/// What caused a stock change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryKind {
    /// Product created with its opening stock
    InitialSetup,
    /// Manual edit of the product record
    Update,
    /// Delivery received
    Restock,
    /// Item added to a tab
    Sale,
    /// Item voided from a tab, or product removed
    VoidDelete,
}

impl fmt::Display for LedgerEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InitialSetup => "INITIAL_SETUP",
            Self::Update => "UPDATE",
            Self::Restock => "RESTOCK",
            Self::Sale => "SALE",
            Self::VoidDelete => "VOID_DELETE",
        };
        f.write_str(s)
    }
}

/// One immutable audit record of a stock change
///
/// Replaying `delta` in `sequence` order from the INITIAL_SETUP entry
/// reconstructs the product's stock; `remaining_stock` is the balance right
/// after this entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    /// Global, strictly increasing
    pub sequence: u64,
    pub product_id: String,
    /// Product name at the time of the change
    pub product_name: String,
    pub kind: LedgerEntryKind,
    /// e.g. "Added - 10", "Sold x3", "Voided x1"
    pub change_description: String,
    pub delta: i64,
    pub remaining_stock: i64,
    pub performed_by: String,
    pub note: Option<String>,
    pub timestamp: i64,
}

/// Stock adjustment request (restock / correction)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub delta: i64,
    pub kind: LedgerEntryKind,
    pub note: Option<String>,
}

/// Result of replaying a product's ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAudit {
    pub product_id: String,
    pub entry_count: usize,
    /// Sum of all deltas
    pub replayed_stock: i64,
    /// `None` once the product has been removed
    pub current_stock: Option<i64>,
    /// Every entry's `remaining_stock` matched the running sum
    pub snapshots_consistent: bool,
    /// Replay agrees with the stored counter (0 for removed products)
    pub consistent: bool,
}

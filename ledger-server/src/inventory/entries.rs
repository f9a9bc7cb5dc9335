//! Human-readable change descriptions for ledger entries

use shared::models::LedgerEntryKind;

/// Describe a stock change the way it is shown in the inventory log
///
/// | Kind | Delta | Text |
/// |------|-------|------|
/// | INITIAL_SETUP | any | `Added - N` |
/// | UPDATE | ≥ 0 | `Added - N` |
/// | UPDATE | < 0 | `Removed - N` |
/// | RESTOCK | any | `Restocked xN` |
/// | SALE | any | `Sold xN` |
/// | VOID_DELETE | > 0 | `Voided xN` |
/// | VOID_DELETE | ≤ 0 | `Removed - N` (product deletion) |
pub fn describe_change(kind: LedgerEntryKind, delta: i64) -> String {
    let n = delta.unsigned_abs();
    match kind {
        LedgerEntryKind::InitialSetup => format!("Added - {}", n),
        LedgerEntryKind::Update if delta >= 0 => format!("Added - {}", n),
        LedgerEntryKind::Update => format!("Removed - {}", n),
        LedgerEntryKind::Restock => format!("Restocked x{}", n),
        LedgerEntryKind::Sale => format!("Sold x{}", n),
        LedgerEntryKind::VoidDelete if delta > 0 => format!("Voided x{}", n),
        LedgerEntryKind::VoidDelete => format!("Removed - {}", n),
    }
}

//! Order Ledger
//!
//! Tabs per table, their line items and stock movements.
//!
//! ```text
//! Call → OrderLedger ─┬─ begin_write ─ validate ─ InventoryLedger (stock + entry)
//!                     │                         └ line items + totals
//!                     └─ commit ─ OrderEvent ─→ broadcast (floor projector, …)
//! ```
//!
//! A mutation either commits entirely (stock, ledger entries, order) or
//! leaves nothing behind. Events are published only after commit, in commit
//! order.

pub mod lines;
pub mod manager;
pub mod money;

pub use manager::OrderLedger;

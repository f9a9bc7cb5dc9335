//! Ledger data model
//!
//! Records owned by the ledger engine and returned verbatim over the API.
//! Money is `rust_decimal::Decimal`; timestamps are UTC milliseconds.

pub mod event;
pub mod ledger;
pub mod order;
pub mod product;

// Re-exports
pub use event::*;
pub use ledger::*;
pub use order::*;
pub use product::*;

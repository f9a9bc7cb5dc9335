//! Shared types for the bar ledger
//!
//! Plain serializable records exchanged between `ledger-server` and its
//! clients: the ledger data model, the error taxonomy, the response
//! envelope and the explicit operator session.

pub mod error;
pub mod models;
pub mod session;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorBody, ErrorKind};
pub use session::SessionContext;

//! Unified error system for the ledger
//!
//! - [`ErrorKind`]: the five failure classes every operation reports
//! - [`AppError`]: kind + human-readable message
//! - [`ApiResponse`]: the `{success, data, error}` envelope returned to callers
//!
//! # Example
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorKind};
//!
//! let err = AppError::not_found("Order order-1");
//! assert_eq!(err.kind, ErrorKind::NotFound);
//!
//! let response = ApiResponse::<()>::error(&err);
//! assert!(!response.success);
//! ```

mod http;
mod kind;
mod types;

pub use kind::ErrorKind;
pub use types::{ApiResponse, AppError, AppResult, ErrorBody};

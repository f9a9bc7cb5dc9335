//! 工具模块 - 错误类型与日志
//!
//! - [`LedgerError`] - 账本操作错误
//! - [`AppError`] / [`ApiResponse`] - HTTP 响应 (from shared::error)

pub mod error;
pub mod logger;

pub use error::{LedgerError, LedgerResult};
pub use shared::error::{ApiResponse, AppError, AppResult};

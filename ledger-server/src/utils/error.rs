//! Ledger error type
//!
//! Every ledger operation returns [`LedgerResult`]. The HTTP layer converts
//! [`LedgerError`] into the shared [`AppError`], which carries the error kind
//! to clients.

use crate::storage::StorageError;
use shared::error::{AppError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i64,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    #[error("{0}")]
    Internal(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            Self::Storage(_) | Self::Timeout(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<redb::TransactionError> for LedgerError {
    fn from(err: redb::TransactionError) -> Self {
        Self::Storage(err.into())
    }
}

impl From<redb::CommitError> for LedgerError {
    fn from(err: redb::CommitError) -> Self {
        Self::Storage(err.into())
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let kind = err.kind();
        match &err {
            // storage details stay in the log
            LedgerError::Storage(e) => {
                tracing::error!(error = %e, "Ledger storage failure");
                AppError::with_message(kind, "Storage failure")
            }
            _ => AppError::with_message(kind, err.to_string()),
        }
    }
}

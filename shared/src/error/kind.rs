//! Error kind taxonomy

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure classes surfaced across the ledger boundary
///
/// | Kind | Meaning |
/// |------|---------|
/// | `NotFound` | unknown order / product |
/// | `Conflict` | duplicate open order, double checkout, stale version, closed order |
/// | `InvalidInput` | non-positive quantity, tendered below total, bad attributes |
/// | `InsufficientStock` | the change would drive stock negative |
/// | `Internal` | persistence failure or timeout |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    InsufficientStock,
    Internal,
}

impl ErrorKind {
    /// Stable string name (matches the serialized form)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::Conflict => "Conflict",
            Self::InvalidInput => "InvalidInput",
            Self::InsufficientStock => "InsufficientStock",
            Self::Internal => "Internal",
        }
    }

    /// Default message when no context is available
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::NotFound => "Resource not found",
            Self::Conflict => "Conflicting state",
            Self::InvalidInput => "Invalid input",
            Self::InsufficientStock => "Insufficient stock",
            Self::Internal => "Internal server error",
        }
    }

    /// Errors the caller cannot fix by changing the request
    pub fn is_system(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_as_name() {
        let json = serde_json::to_string(&ErrorKind::InsufficientStock).unwrap();
        assert_eq!(json, "\"InsufficientStock\"");
        assert_eq!(ErrorKind::InsufficientStock.to_string(), "InsufficientStock");
    }

    #[test]
    fn test_only_internal_is_system() {
        assert!(ErrorKind::Internal.is_system());
        assert!(!ErrorKind::Conflict.is_system());
        assert!(!ErrorKind::NotFound.is_system());
    }
}

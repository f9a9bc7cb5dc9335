//! Operator session context
//!
//! The identity collaborator authenticates operators; the ledger only needs
//! to know who is acting and since when. The context is passed explicitly
//! into every mutating call instead of being looked up from a global
//! "currently logged in" flag.

use serde::{Deserialize, Serialize};

/// The active operator of a terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Stamped into `performed_by` / `opened_by`
    pub username: String,
    /// Manager | Bartender | Admin (informational only)
    pub role: String,
    /// Login moment (UTC millis), scopes session sales
    pub session_started_at: i64,
}

impl SessionContext {
    pub fn new(
        username: impl Into<String>,
        role: impl Into<String>,
        session_started_at: i64,
    ) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
            session_started_at,
        }
    }

    /// Name used for audit fields (`performed_by`, `opened_by`)
    pub fn actor(&self) -> &str {
        &self.username
    }
}

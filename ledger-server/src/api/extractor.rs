//! Operator Extractor
//!
//! Builds the [`SessionContext`] of the calling terminal from request
//! headers. Identity is established upstream; the ledger trusts these
//! headers and only requires an operator name.
//!
//! | Header | Required | Meaning |
//! |--------|----------|---------|
//! | `X-Operator` | yes | username |
//! | `X-Role` | no | role, defaults to `Bartender` |
//! | `X-Session-Started-At` | no | login time (UTC millis), defaults to 0 |

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::{AppError, SessionContext};

use crate::core::ServerState;

pub const OPERATOR_HEADER: &str = "x-operator";
pub const ROLE_HEADER: &str = "x-role";
pub const SESSION_STARTED_HEADER: &str = "x-session-started-at";

const DEFAULT_ROLE: &str = "Bartender";

/// The operator acting through this request
#[derive(Debug, Clone)]
pub struct Operator(pub SessionContext);

impl FromRequestParts<ServerState> for Operator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let username = header(OPERATOR_HEADER)
            .ok_or_else(|| AppError::invalid_input("Missing X-Operator header"))?;
        let role = header(ROLE_HEADER).unwrap_or(DEFAULT_ROLE);
        let started_at = match header(SESSION_STARTED_HEADER) {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                AppError::invalid_input(format!("Invalid X-Session-Started-At: {}", raw))
            })?,
            None => 0,
        };

        Ok(Operator(SessionContext::new(username, role, started_at)))
    }
}

//! Session Sales
//!
//! Totals of the tabs an operator settled since logging in. A paid order
//! counts for the cashier who closed it (`opened_by` is rewritten at
//! checkout) and only when it closed at or after the session start.

use crate::storage::{LedgerStorage, with_read_retry};
use crate::utils::LedgerResult;
use rust_decimal::Decimal;
use shared::SessionContext;
use shared::models::{OrderStatus, SessionSales};

pub struct SessionSalesAggregator {
    storage: LedgerStorage,
}

impl SessionSalesAggregator {
    pub fn new(storage: LedgerStorage) -> Self {
        Self { storage }
    }

    /// Sales of `username` closed at or after `since` (UTC millis)
    pub fn get_session_sales(&self, username: &str, since: i64) -> LedgerResult<SessionSales> {
        let orders = with_read_retry("session_sales", || self.storage.list_orders())?;

        let mut total = Decimal::ZERO;
        let mut count = 0u64;
        for order in orders.iter().filter(|o| {
            o.status == OrderStatus::Paid
                && o.opened_by.as_deref() == Some(username)
                && o.closed_at.is_some_and(|closed| closed >= since)
        }) {
            total += order.total;
            count += 1;
        }

        tracing::debug!(username, since, count, total = %total, "Session sales computed");
        Ok(SessionSales {
            username: username.to_string(),
            since,
            total,
            count,
        })
    }

    /// Sales of the session's operator since its login
    pub fn for_session(&self, session: &SessionContext) -> LedgerResult<SessionSales> {
        self.get_session_sales(session.actor(), session.session_started_at)
    }
}

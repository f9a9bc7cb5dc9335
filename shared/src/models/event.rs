//! Change notifications published after every committed order mutation

use super::order::{Order, TableStatus};
use serde::{Deserialize, Serialize};

/// What happened to an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    Opened,
    Updated,
    Paid,
    Voided,
}

/// Post-commit order state broadcast by the order ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub event_type: OrderEventType,
    /// Order as committed
    pub order: Order,
    pub timestamp: i64,
}

impl OrderEvent {
    pub fn new(event_type: OrderEventType, order: Order) -> Self {
        Self {
            event_type,
            order,
            timestamp: crate::util::now_millis(),
        }
    }

    /// Whether the order still occupies its table after this event
    pub fn occupies_table(&self) -> bool {
        self.order.is_open()
    }
}

/// Floor projection change pushed to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FloorEvent {
    /// Table opened or its tab changed
    Upserted(TableStatus),
    /// Table released (paid or void)
    Cleared {
        table_identifier: String,
        order_id: String,
    },
    /// Projection rebuilt from storage; subscribers should refetch
    Resynced,
}

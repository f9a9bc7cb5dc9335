//! Checkout
//!
//! Settles an open tab: validates the cash, marks the order paid and frees
//! the table in one commit, then queues the receipt for the print worker.
//! Stock is untouched here; it already moved when items were added.

use crate::orders::{OrderLedger, money};
use crate::services::ReceiptSender;
use crate::utils::LedgerResult;
use rust_decimal::Decimal;
use shared::SessionContext;
use shared::models::{ClosedOrderProjection, Order, OrderEventType, OrderStatus};
use shared::util::now_millis;
use std::sync::Arc;

pub struct CheckoutOrchestrator {
    orders: Arc<OrderLedger>,
    receipts: ReceiptSender,
}

impl CheckoutOrchestrator {
    pub fn new(orders: Arc<OrderLedger>, receipts: ReceiptSender) -> Self {
        Self { orders, receipts }
    }

    /// Pay an open order in cash
    ///
    /// A second checkout of the same order fails with Conflict and changes
    /// nothing. Printing happens off this call; the payment stands whatever
    /// the printer does.
    pub fn checkout(
        &self,
        order_id: &str,
        tendered: Decimal,
        session: &SessionContext,
    ) -> LedgerResult<ClosedOrderProjection> {
        let cashier = session.actor().to_string();

        let order = self
            .orders
            .mutate(order_id, None, OrderEventType::Paid, |_, order| {
                money::validate_tendered(tendered, order.total)?;
                order.status = OrderStatus::Paid;
                order.closed_at = Some(now_millis());
                order.is_reserved = false;
                order.opened_by = Some(cashier.clone());
                order.tendered = Some(tendered);
                order.change = Some(money::change_due(tendered, order.total));
                Ok(())
            })?;

        let receipt = project(&order, &cashier);
        tracing::info!(
            order_id = %receipt.order_id,
            table = %receipt.table_identifier,
            total = %receipt.total,
            cashier = %receipt.cashier,
            "Order paid"
        );

        if self.receipts.send(receipt.clone()).is_err() {
            tracing::warn!(order_id = %receipt.order_id, "Receipt queue closed; receipt not printed");
        }

        Ok(receipt)
    }
}

fn project(order: &Order, cashier: &str) -> ClosedOrderProjection {
    let tendered = order.tendered.unwrap_or(order.total);
    ClosedOrderProjection {
        order_id: order.id.clone(),
        table_identifier: order.table_identifier.clone(),
        items: order.items.clone(),
        total: order.total,
        tendered,
        change: order.change.unwrap_or(Decimal::ZERO),
        cashier: cashier.to_string(),
        closed_at: order.closed_at.unwrap_or(order.updated_at),
    }
}

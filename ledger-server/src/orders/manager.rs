//! OrderLedger - tab lifecycle and line items
//!
//! Every mutation runs through [`OrderLedger::mutate`]:
//!
//! 1. `begin_write` (serializes against every other writer)
//! 2. load the order, require it open, check `expected_version`
//! 3. apply the change (stock moves go through the inventory ledger
//!    inside the same transaction)
//! 4. recompute totals, bump `version`, persist
//! 5. commit, then broadcast an [`OrderEvent`]

use super::{lines, money};
use crate::inventory::InventoryLedger;
use crate::storage::{LedgerStorage, StorageError, with_read_retry};
use crate::utils::{LedgerError, LedgerResult};
use parking_lot::Mutex;
use redb::WriteTransaction;
use rust_decimal::Decimal;
use shared::SessionContext;
use shared::models::{
    AddItemInput, LedgerEntryKind, Order, OrderEvent, OrderEventType, OrderStatus, ServeInput,
    VoidItemInput, VoidOrderInput,
};
use shared::util::{new_id, now_millis};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default event channel capacity
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

pub struct OrderLedger {
    storage: LedgerStorage,
    inventory: Arc<InventoryLedger>,
    event_tx: broadcast::Sender<OrderEvent>,
    /// Held from just before commit until the event is sent, so events leave
    /// in the same order the transactions committed
    publish_lock: Mutex<()>,
}

impl std::fmt::Debug for OrderLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderLedger")
            .field("storage", &self.storage)
            .field("event_tx", &"<broadcast::Sender>")
            .finish()
    }
}

impl OrderLedger {
    pub fn new(storage: LedgerStorage, inventory: Arc<InventoryLedger>) -> Self {
        Self::with_capacity(storage, inventory, DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(
        storage: LedgerStorage,
        inventory: Arc<InventoryLedger>,
        capacity: usize,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            storage,
            inventory,
            event_tx,
            publish_lock: Mutex::new(()),
        }
    }

    /// Subscribe to post-commit order events
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    pub fn storage(&self) -> &LedgerStorage {
        &self.storage
    }

    // ========== Tabs ==========

    /// The table's open tab, if any
    pub fn try_get_open_order(&self, table_identifier: &str) -> LedgerResult<Option<Order>> {
        let table = validate_table(table_identifier)?;
        Ok(with_read_retry("try_get_open_order", || {
            self.storage.find_open_order(&table)
        })?)
    }

    /// Open a new tab; Conflict if the table already has one
    pub fn create_open_order(
        &self,
        table_identifier: &str,
        session: &SessionContext,
    ) -> LedgerResult<Order> {
        let table = validate_table(table_identifier)?;
        let txn = self.storage.begin_write()?;
        if let Some(existing) = self.storage.find_open_order_id_txn(&txn, &table)? {
            return Err(LedgerError::conflict(format!(
                "Table {} already has open order {}",
                table, existing
            )));
        }
        let order = self.insert_open_order(&txn, &table, session, false)?;
        self.commit_and_publish(txn, OrderEventType::Opened, &order)?;

        tracing::info!(order_id = %order.id, table = %table, "Order opened");
        Ok(order)
    }

    /// The table's open tab, opening one when there is none
    ///
    /// Safe under concurrency: the lookup and the insert share one write
    /// transaction, so two callers on the same table get the same order.
    pub fn get_or_create_open_order(
        &self,
        table_identifier: &str,
        session: &SessionContext,
    ) -> LedgerResult<Order> {
        let table = validate_table(table_identifier)?;
        let txn = self.storage.begin_write()?;
        if let Some(order_id) = self.storage.find_open_order_id_txn(&txn, &table)? {
            let order = self.load_in_txn(&txn, &order_id)?;
            txn.abort().map_err(StorageError::from)?;
            return Ok(order);
        }
        let order = self.insert_open_order(&txn, &table, session, false)?;
        self.commit_and_publish(txn, OrderEventType::Opened, &order)?;

        tracing::info!(order_id = %order.id, table = %table, "Order opened");
        Ok(order)
    }

    pub fn get_order(&self, order_id: &str) -> LedgerResult<Order> {
        with_read_retry("get_order", || self.storage.get_order(order_id))?
            .ok_or_else(|| LedgerError::not_found(format!("Order {}", order_id)))
    }

    /// All open tabs, ordered by table
    pub fn list_open_orders(&self) -> LedgerResult<Vec<Order>> {
        Ok(with_read_retry("list_open_orders", || {
            self.storage.list_open_orders()
        })?)
    }

    // ========== Line items ==========

    /// Sell a product onto the tab (SALE entry, stock decremented)
    pub fn add_item(
        &self,
        order_id: &str,
        input: AddItemInput,
        session: &SessionContext,
    ) -> LedgerResult<Order> {
        money::validate_quantity(input.quantity)?;
        let actor = session.actor().to_string();

        let order = self.mutate(
            order_id,
            input.expected_version,
            OrderEventType::Updated,
            |txn, order| {
                let product = self
                    .inventory
                    .get_product_in_txn(txn, &input.product_id)?
                    .ok_or_else(|| {
                        LedgerError::not_found(format!("Product {}", input.product_id))
                    })?;
                if !product.available {
                    return Err(LedgerError::invalid(format!(
                        "Product {} is not available",
                        product.name
                    )));
                }

                self.inventory.adjust_stock_in_txn(
                    txn,
                    &product.id,
                    -i64::from(input.quantity),
                    LedgerEntryKind::Sale,
                    &actor,
                    Some(format!("Table {} - Order added", order.table_identifier)),
                )?;
                lines::add_or_merge(order, &product, input.quantity, input.note)
            },
        )?;

        tracing::debug!(
            order_id = %order_id,
            product_id = %input.product_id,
            quantity = input.quantity,
            total = %order.total,
            "Item added"
        );
        Ok(order)
    }

    /// Take items back off the tab (VOID_DELETE entry, stock returned)
    ///
    /// When the product has since been removed from the catalog the line is
    /// still taken off, but there is no stock to return.
    pub fn void_item(
        &self,
        order_id: &str,
        input: VoidItemInput,
        session: &SessionContext,
    ) -> LedgerResult<Order> {
        money::validate_quantity(input.quantity)?;
        let actor = session.actor().to_string();
        let mut removed_value = Decimal::ZERO;

        let order = self.mutate(
            order_id,
            input.expected_version,
            OrderEventType::Updated,
            |txn, order| {
                let on_tab = order.quantity_of(&input.product_id);
                if on_tab == 0 {
                    return Err(LedgerError::not_found(format!(
                        "Product {} on order {}",
                        input.product_id, order.id
                    )));
                }
                if i64::from(input.quantity) > on_tab {
                    return Err(LedgerError::invalid(format!(
                        "Cannot void {} of product {}: only {} on the tab",
                        input.quantity, input.product_id, on_tab
                    )));
                }

                if self
                    .inventory
                    .get_product_in_txn(txn, &input.product_id)?
                    .is_some()
                {
                    self.inventory.adjust_stock_in_txn(
                        txn,
                        &input.product_id,
                        i64::from(input.quantity),
                        LedgerEntryKind::VoidDelete,
                        &actor,
                        Some(format!("Table {} - Item removed", order.table_identifier)),
                    )?;
                } else {
                    tracing::warn!(
                        product_id = %input.product_id,
                        order_id = %order.id,
                        "Voiding line of a removed product; no stock returned"
                    );
                }

                removed_value = lines::remove_quantity(order, &input.product_id, input.quantity);
                Ok(())
            },
        )?;

        tracing::debug!(
            order_id = %order_id,
            product_id = %input.product_id,
            quantity = input.quantity,
            removed = %removed_value,
            total = %order.total,
            "Item voided"
        );
        Ok(order)
    }

    /// Send pending lines to the bar
    pub fn place_order(&self, order_id: &str, expected_version: Option<u64>) -> LedgerResult<Order> {
        self.mutate(order_id, expected_version, OrderEventType::Updated, |_, order| {
            if lines::send_pending(order) == 0 {
                return Err(LedgerError::invalid(format!(
                    "Order {} has no pending items",
                    order.id
                )));
            }
            Ok(())
        })
    }

    /// Mark sent lines as served
    pub fn mark_served(&self, order_id: &str, input: ServeInput) -> LedgerResult<Order> {
        self.mutate(order_id, None, OrderEventType::Updated, |_, order| {
            if lines::serve_sent(order, input.product_id.as_deref()) == 0 {
                return Err(LedgerError::invalid(format!(
                    "Order {} has no sent items to serve",
                    order.id
                )));
            }
            Ok(())
        })
    }

    /// Flip the reservation flag of the table's open tab
    ///
    /// Without an open tab a new one is opened already reserved.
    pub fn toggle_reservation(
        &self,
        table_identifier: &str,
        session: &SessionContext,
    ) -> LedgerResult<Order> {
        let table = validate_table(table_identifier)?;
        let txn = self.storage.begin_write()?;

        let (order, event_type) = match self.storage.find_open_order_id_txn(&txn, &table)? {
            Some(order_id) => {
                let mut order = self.load_in_txn(&txn, &order_id)?;
                order.is_reserved = !order.is_reserved;
                order.version += 1;
                order.updated_at = now_millis();
                self.storage.store_order(&txn, &order)?;
                (order, OrderEventType::Updated)
            }
            None => (
                self.insert_open_order(&txn, &table, session, true)?,
                OrderEventType::Opened,
            ),
        };
        self.commit_and_publish(txn, event_type, &order)?;

        tracing::info!(
            order_id = %order.id,
            table = %table,
            reserved = order.is_reserved,
            "Reservation toggled"
        );
        Ok(order)
    }

    /// Cancel a whole tab, returning every item to stock
    pub fn void_order(
        &self,
        order_id: &str,
        input: VoidOrderInput,
        session: &SessionContext,
    ) -> LedgerResult<Order> {
        let actor = session.actor().to_string();
        let order = self.mutate(order_id, None, OrderEventType::Voided, |txn, order| {
            let note = format!("Table {} - Order voided", order.table_identifier);
            for line in &order.items {
                if self.inventory.get_product_in_txn(txn, &line.product_id)?.is_none() {
                    continue;
                }
                self.inventory.adjust_stock_in_txn(
                    txn,
                    &line.product_id,
                    i64::from(line.quantity),
                    LedgerEntryKind::VoidDelete,
                    &actor,
                    Some(note.clone()),
                )?;
            }
            order.status = OrderStatus::Void;
            order.is_reserved = false;
            order.closed_at = Some(now_millis());
            order.void_reason = input.reason.filter(|r| !r.trim().is_empty());
            Ok(())
        })?;

        tracing::info!(order_id = %order.id, table = %order.table_identifier, "Order voided");
        Ok(order)
    }

    // ========== Internals ==========

    /// Load, validate, change, persist, commit, publish
    ///
    /// The closure sees the order inside the write transaction. Any error
    /// drops the transaction, which aborts it.
    pub(crate) fn mutate<F>(
        &self,
        order_id: &str,
        expected_version: Option<u64>,
        event_type: OrderEventType,
        apply: F,
    ) -> LedgerResult<Order>
    where
        F: FnOnce(&WriteTransaction, &mut Order) -> LedgerResult<()>,
    {
        let txn = self.storage.begin_write()?;
        let mut order = self.load_in_txn(&txn, order_id)?;

        if !order.is_open() {
            return Err(LedgerError::conflict(format!(
                "Order {} is already {}",
                order.id,
                status_label(order.status)
            )));
        }
        if let Some(expected) = expected_version
            && expected != order.version
        {
            return Err(LedgerError::conflict(format!(
                "Order {} was modified (expected version {}, current {})",
                order.id, expected, order.version
            )));
        }

        apply(&txn, &mut order)?;

        money::recalculate_totals(&mut order);
        order.version += 1;
        order.updated_at = now_millis();
        self.storage.store_order(&txn, &order)?;
        if !order.is_open() {
            self.storage.clear_open_table(&txn, &order.table_identifier)?;
        }

        self.commit_and_publish(txn, event_type, &order)?;
        Ok(order)
    }

    fn load_in_txn(&self, txn: &WriteTransaction, order_id: &str) -> LedgerResult<Order> {
        self.storage
            .get_order_txn(txn, order_id)?
            .ok_or_else(|| LedgerError::not_found(format!("Order {}", order_id)))
    }

    fn insert_open_order(
        &self,
        txn: &WriteTransaction,
        table: &str,
        session: &SessionContext,
        reserved: bool,
    ) -> LedgerResult<Order> {
        let mut order = Order::new(
            new_id(),
            table.to_string(),
            Some(session.actor().to_string()),
            now_millis(),
        );
        order.is_reserved = reserved;
        self.storage.store_order(txn, &order)?;
        self.storage.set_open_table(txn, table, &order.id)?;
        Ok(order)
    }

    fn commit_and_publish(
        &self,
        txn: WriteTransaction,
        event_type: OrderEventType,
        order: &Order,
    ) -> LedgerResult<()> {
        let _guard = self.publish_lock.lock();
        txn.commit()?;
        if self
            .event_tx
            .send(OrderEvent::new(event_type, order.clone()))
            .is_err()
        {
            tracing::trace!(order_id = %order.id, "No order event subscribers");
        }
        Ok(())
    }
}

fn validate_table(table_identifier: &str) -> LedgerResult<String> {
    let trimmed = table_identifier.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid("table identifier must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Open => "open",
        OrderStatus::Paid => "paid",
        OrderStatus::Void => "void",
    }
}

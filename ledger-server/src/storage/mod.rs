//! redb-based persistence for the ledger
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `product_id` | `Product` | Stock counters |
//! | `ledger_entries` | `(product_id, sequence)` | `LedgerEntry` | Audit trail (append-only) |
//! | `orders` | `order_id` | `Order` | Tabs, open and closed |
//! | `open_tables` | `table_identifier` | `order_id` | At most one open tab per table |
//! | `sequence_counter` | `"ledger_seq"` | `u64` | Global ledger sequence |
//!
//! # Concurrency
//!
//! redb admits one write transaction at a time; `begin_write` blocks until the
//! previous writer commits or aborts. Every mutating ledger operation reads,
//! validates and writes inside a single write transaction, so mutations are
//! serialized and an aborted transaction leaves no partial state.
//! Never call `begin_write` while holding another write transaction on the
//! same thread: redb does not allow nested writers.
//!
//! Read transactions are MVCC snapshots and never block writers.

mod retry;

pub use retry::with_read_retry;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::{LedgerEntry, Order, Product};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Products: key = product_id, value = JSON-serialized Product
const PRODUCTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("products");

/// Ledger entries: key = (product_id, sequence), value = JSON-serialized LedgerEntry
const LEDGER_TABLE: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("ledger_entries");

/// Orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Open tab index: key = table_identifier, value = order_id
const OPEN_TABLES_TABLE: TableDefinition<&str, &str> = TableDefinition::new("open_tables");

/// Counters
const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const LEDGER_SEQUENCE_KEY: &str = "ledger_seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Ledger storage backed by redb
#[derive(Clone)]
pub struct LedgerStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for LedgerStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerStorage").finish_non_exhaustive()
    }
}

impl LedgerStorage {
    /// Open or create the database at the given path
    ///
    /// redb commits with `Durability::Immediate` by default: once `commit()`
    /// returns the change survives power loss, which matters for terminals
    /// that get switched off at closing time.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and demos)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(LEDGER_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(OPEN_TABLES_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(LEDGER_SEQUENCE_KEY)?.is_none() {
                seq_table.insert(LEDGER_SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction (blocks while another writer is active)
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Sequence ==========

    /// Increment and return the ledger sequence
    pub fn next_ledger_sequence(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table
            .get(LEDGER_SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(LEDGER_SEQUENCE_KEY, next)?;
        Ok(next)
    }

    /// Current ledger sequence (read-only)
    pub fn current_ledger_sequence(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table
            .get(LEDGER_SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0))
    }

    // ========== Products ==========

    pub fn store_product(&self, txn: &WriteTransaction, product: &Product) -> StorageResult<()> {
        let mut table = txn.open_table(PRODUCTS_TABLE)?;
        let value = serde_json::to_vec(product)?;
        table.insert(product.id.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn remove_product(&self, txn: &WriteTransaction, product_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(PRODUCTS_TABLE)?;
        table.remove(product_id)?;
        Ok(())
    }

    pub fn get_product(&self, product_id: &str) -> StorageResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        match table.get(product_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_product_txn(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
    ) -> StorageResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;
        match table.get(product_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn list_products(&self) -> StorageResult<Vec<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;

        let mut products = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            products.push(serde_json::from_slice(value.value())?);
        }
        Ok(products)
    }

    /// Find a product by name, case-insensitive (within transaction)
    pub fn find_product_by_name_txn(
        &self,
        txn: &WriteTransaction,
        name: &str,
    ) -> StorageResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;
        for result in table.iter()? {
            let (_key, value) = result?;
            let product: Product = serde_json::from_slice(value.value())?;
            if product.name.eq_ignore_ascii_case(name) {
                return Ok(Some(product));
            }
        }
        Ok(None)
    }

    // ========== Ledger Entries ==========

    /// Append a ledger entry (entries are never updated or removed)
    pub fn append_entry(&self, txn: &WriteTransaction, entry: &LedgerEntry) -> StorageResult<()> {
        let mut table = txn.open_table(LEDGER_TABLE)?;
        let value = serde_json::to_vec(entry)?;
        table.insert((entry.product_id.as_str(), entry.sequence), value.as_slice())?;
        Ok(())
    }

    /// All entries of one product, oldest first
    pub fn get_entries_for_product(&self, product_id: &str) -> StorageResult<Vec<LedgerEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LEDGER_TABLE)?;

        let mut entries: Vec<LedgerEntry> = Vec::new();
        for result in table.range((product_id, 0u64)..=(product_id, u64::MAX))? {
            let (_key, value) = result?;
            entries.push(serde_json::from_slice(value.value())?);
        }

        entries.sort_by_key(|e| e.sequence);
        Ok(entries)
    }

    /// Every entry of every product, oldest first
    pub fn get_all_entries(&self) -> StorageResult<Vec<LedgerEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LEDGER_TABLE)?;

        let mut entries: Vec<LedgerEntry> = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            entries.push(serde_json::from_slice(value.value())?);
        }

        entries.sort_by_key(|e| e.sequence);
        Ok(entries)
    }

    // ========== Orders ==========

    pub fn store_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.id.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Every order ever stored (open and closed)
    pub fn list_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    // ========== Open Table Index ==========

    /// Register the open tab of a table
    pub fn set_open_table(
        &self,
        txn: &WriteTransaction,
        table_identifier: &str,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(OPEN_TABLES_TABLE)?;
        table.insert(table_identifier, order_id)?;
        Ok(())
    }

    /// Release a table
    pub fn clear_open_table(
        &self,
        txn: &WriteTransaction,
        table_identifier: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(OPEN_TABLES_TABLE)?;
        table.remove(table_identifier)?;
        Ok(())
    }

    /// Order id of the table's open tab (within transaction)
    pub fn find_open_order_id_txn(
        &self,
        txn: &WriteTransaction,
        table_identifier: &str,
    ) -> StorageResult<Option<String>> {
        let table = txn.open_table(OPEN_TABLES_TABLE)?;
        Ok(table
            .get(table_identifier)?
            .map(|guard| guard.value().to_string()))
    }

    /// The table's open tab (read-only, outside transaction)
    pub fn find_open_order(&self, table_identifier: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(OPEN_TABLES_TABLE)?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;

        let Some(order_id) = index.get(table_identifier)? else {
            return Ok(None);
        };
        match orders.get(order_id.value())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All open tabs, ordered by table identifier
    pub fn list_open_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(OPEN_TABLES_TABLE)?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;

        let mut open = Vec::new();
        for result in index.iter()? {
            let (_table, order_id) = result?;
            if let Some(value) = orders.get(order_id.value())? {
                open.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::LedgerEntryKind;

    fn create_test_product(id: &str, name: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            price: Decimal::from(50),
            category: "Beer".to_string(),
            current_stock: 10,
            low_stock_threshold: 5,
            available: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn create_test_entry(product_id: &str, sequence: u64, delta: i64, remaining: i64) -> LedgerEntry {
        LedgerEntry {
            id: format!("entry-{}", sequence),
            sequence,
            product_id: product_id.to_string(),
            product_name: "Test".to_string(),
            kind: LedgerEntryKind::Update,
            change_description: format!("Added - {}", delta),
            delta,
            remaining_stock: remaining,
            performed_by: "tester".to_string(),
            note: None,
            timestamp: 0,
        }
    }

    #[test]
    fn test_open_in_memory() {
        let storage = LedgerStorage::open_in_memory().unwrap();
        assert_eq!(storage.current_ledger_sequence().unwrap(), 0);
        assert!(storage.list_products().unwrap().is_empty());
        assert!(storage.list_open_orders().unwrap().is_empty());
    }

    #[test]
    fn test_sequence_increments_within_commit() {
        let storage = LedgerStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        assert_eq!(storage.next_ledger_sequence(&txn).unwrap(), 1);
        assert_eq!(storage.next_ledger_sequence(&txn).unwrap(), 2);
        txn.commit().unwrap();

        assert_eq!(storage.current_ledger_sequence().unwrap(), 2);
    }

    #[test]
    fn test_uncommitted_transaction_leaves_no_trace() {
        let storage = LedgerStorage::open_in_memory().unwrap();

        {
            let txn = storage.begin_write().unwrap();
            storage
                .store_product(&txn, &create_test_product("p-1", "Beer"))
                .unwrap();
            storage.next_ledger_sequence(&txn).unwrap();
            // dropped without commit
        }

        assert!(storage.get_product("p-1").unwrap().is_none());
        assert_eq!(storage.current_ledger_sequence().unwrap(), 0);
    }

    #[test]
    fn test_product_store_find_remove() {
        let storage = LedgerStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage
            .store_product(&txn, &create_test_product("p-1", "Red Horse"))
            .unwrap();
        let found = storage.find_product_by_name_txn(&txn, "red horse").unwrap();
        assert_eq!(found.map(|p| p.id), Some("p-1".to_string()));
        txn.commit().unwrap();

        assert!(storage.get_product("p-1").unwrap().is_some());

        let txn = storage.begin_write().unwrap();
        storage.remove_product(&txn, "p-1").unwrap();
        txn.commit().unwrap();

        assert!(storage.get_product("p-1").unwrap().is_none());
    }

    #[test]
    fn test_entries_are_scoped_and_ordered() {
        let storage = LedgerStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        storage.append_entry(&txn, &create_test_entry("p-1", 3, -2, 8)).unwrap();
        storage.append_entry(&txn, &create_test_entry("p-2", 2, 4, 4)).unwrap();
        storage.append_entry(&txn, &create_test_entry("p-1", 1, 10, 10)).unwrap();
        txn.commit().unwrap();

        let entries = storage.get_entries_for_product("p-1").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].sequence, 1);
        assert_eq!(entries[1].sequence, 3);

        let all = storage.get_all_entries().unwrap();
        let sequences: Vec<u64> = all.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
    }

    #[test]
    fn test_open_table_index() {
        let storage = LedgerStorage::open_in_memory().unwrap();
        let order = Order::new("order-1".into(), "T1".into(), None, 0);

        let txn = storage.begin_write().unwrap();
        storage.store_order(&txn, &order).unwrap();
        storage.set_open_table(&txn, "T1", "order-1").unwrap();
        assert_eq!(
            storage.find_open_order_id_txn(&txn, "T1").unwrap().as_deref(),
            Some("order-1")
        );
        txn.commit().unwrap();

        assert_eq!(storage.find_open_order("T1").unwrap().map(|o| o.id), Some("order-1".into()));
        assert_eq!(storage.list_open_orders().unwrap().len(), 1);

        let txn = storage.begin_write().unwrap();
        storage.clear_open_table(&txn, "T1").unwrap();
        txn.commit().unwrap();

        assert!(storage.find_open_order("T1").unwrap().is_none());
        assert!(storage.list_open_orders().unwrap().is_empty());
        // the order record itself is kept
        assert!(storage.get_order("order-1").unwrap().is_some());
    }
}

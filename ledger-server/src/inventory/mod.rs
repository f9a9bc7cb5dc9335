//! Inventory Ledger
//!
//! Owns every write to `Product::current_stock`. Each stock change is paired
//! with exactly one append-only [`LedgerEntry`] in the same write
//! transaction, so replaying the entries of a product in sequence order
//! always reproduces its stock.
//!
//! Public operations open their own transaction. The `*_in_txn` variants
//! join a transaction owned by the caller (the order ledger), which keeps a
//! sale and its line item in one atomic commit.

mod entries;

pub use entries::describe_change;

use crate::orders::money;
use crate::services::CategoryCatalog;
use crate::storage::{LedgerStorage, with_read_retry};
use crate::utils::{LedgerError, LedgerResult};
use redb::WriteTransaction;
use shared::models::{
    DEFAULT_LOW_STOCK_THRESHOLD, LedgerEntry, LedgerEntryKind, Product, ProductCreate,
    ProductUpdate, StockAudit,
};
use shared::SessionContext;
use shared::util::{new_id, now_millis};
use std::sync::Arc;

/// Note stamped on the VOID_DELETE entry of a removed product
const REMOVAL_NOTE: &str = "Permanent deletion";

pub struct InventoryLedger {
    storage: LedgerStorage,
    catalog: Arc<dyn CategoryCatalog>,
    default_low_stock_threshold: i64,
}

impl std::fmt::Debug for InventoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryLedger")
            .field("default_low_stock_threshold", &self.default_low_stock_threshold)
            .finish_non_exhaustive()
    }
}

impl InventoryLedger {
    pub fn new(storage: LedgerStorage, catalog: Arc<dyn CategoryCatalog>) -> Self {
        Self {
            storage,
            catalog,
            default_low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    /// Threshold used when a new product does not carry one
    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.default_low_stock_threshold = threshold.max(0);
        self
    }

    pub fn storage(&self) -> &LedgerStorage {
        &self.storage
    }

    // ========== Catalog maintenance ==========

    /// Create a product and record its opening stock (INITIAL_SETUP)
    pub fn create_product(
        &self,
        attrs: ProductCreate,
        session: &SessionContext,
    ) -> LedgerResult<Product> {
        let name = validate_name(&attrs.name)?;
        let category = self.validate_category(&attrs.category)?;
        money::validate_price(attrs.price)?;
        if attrs.current_stock < 0 {
            return Err(LedgerError::invalid(format!(
                "current_stock must be non-negative, got {}",
                attrs.current_stock
            )));
        }
        let threshold = attrs
            .low_stock_threshold
            .unwrap_or(self.default_low_stock_threshold);
        validate_threshold(threshold)?;

        let txn = self.storage.begin_write()?;
        if self.storage.find_product_by_name_txn(&txn, &name)?.is_some() {
            return Err(LedgerError::conflict(format!(
                "Product '{}' already exists",
                name
            )));
        }

        let now = now_millis();
        let product = Product {
            id: new_id(),
            name,
            price: attrs.price,
            category,
            current_stock: attrs.current_stock,
            low_stock_threshold: threshold,
            available: attrs.available.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        self.storage.store_product(&txn, &product)?;
        self.append_entry(
            &txn,
            &product,
            LedgerEntryKind::InitialSetup,
            product.current_stock,
            session.actor(),
            attrs.note,
        )?;
        txn.commit()?;

        tracing::info!(
            product_id = %product.id,
            name = %product.name,
            stock = product.current_stock,
            "Product created"
        );
        Ok(product)
    }

    /// Update product fields; a stock change is logged as UPDATE
    pub fn update_product(
        &self,
        product_id: &str,
        attrs: ProductUpdate,
        session: &SessionContext,
    ) -> LedgerResult<Product> {
        let new_name = attrs.name.as_deref().map(validate_name).transpose()?;
        let new_category = attrs
            .category
            .as_deref()
            .map(|c| self.validate_category(c))
            .transpose()?;
        if let Some(price) = attrs.price {
            money::validate_price(price)?;
        }
        if let Some(stock) = attrs.current_stock
            && stock < 0
        {
            return Err(LedgerError::invalid(format!(
                "current_stock must be non-negative, got {}",
                stock
            )));
        }
        if let Some(threshold) = attrs.low_stock_threshold {
            validate_threshold(threshold)?;
        }

        let txn = self.storage.begin_write()?;
        let mut product = self
            .storage
            .get_product_txn(&txn, product_id)?
            .ok_or_else(|| LedgerError::not_found(format!("Product {}", product_id)))?;

        if let Some(name) = new_name {
            if let Some(existing) = self.storage.find_product_by_name_txn(&txn, &name)?
                && existing.id != product.id
            {
                return Err(LedgerError::conflict(format!(
                    "Product '{}' already exists",
                    name
                )));
            }
            product.name = name;
        }
        if let Some(category) = new_category {
            product.category = category;
        }
        if let Some(price) = attrs.price {
            product.price = price;
        }
        if let Some(threshold) = attrs.low_stock_threshold {
            product.low_stock_threshold = threshold;
        }
        if let Some(available) = attrs.available {
            product.available = available;
        }

        let delta = attrs
            .current_stock
            .map(|stock| stock - product.current_stock)
            .unwrap_or(0);
        product.current_stock += delta;
        product.updated_at = now_millis();

        self.storage.store_product(&txn, &product)?;
        self.append_entry(
            &txn,
            &product,
            LedgerEntryKind::Update,
            delta,
            session.actor(),
            attrs.note,
        )?;
        txn.commit()?;

        tracing::info!(product_id = %product.id, delta, "Product updated");
        Ok(product)
    }

    /// Delete a product, logging its remaining stock as VOID_DELETE
    ///
    /// Ledger history of the product is kept.
    pub fn remove_product(
        &self,
        product_id: &str,
        session: &SessionContext,
        note: Option<String>,
    ) -> LedgerResult<()> {
        let txn = self.storage.begin_write()?;
        let mut product = self
            .storage
            .get_product_txn(&txn, product_id)?
            .ok_or_else(|| LedgerError::not_found(format!("Product {}", product_id)))?;

        let delta = -product.current_stock;
        product.current_stock = 0;
        self.append_entry(
            &txn,
            &product,
            LedgerEntryKind::VoidDelete,
            delta,
            session.actor(),
            Some(note.unwrap_or_else(|| REMOVAL_NOTE.to_string())),
        )?;
        self.storage.remove_product(&txn, product_id)?;
        txn.commit()?;

        tracing::info!(product_id = %product_id, name = %product.name, "Product removed");
        Ok(())
    }

    // ========== Stock changes ==========

    /// Apply a signed stock change and log it
    ///
    /// Returns the new stock. Fails with InsufficientStock when the result
    /// would go below zero.
    pub fn adjust_stock(
        &self,
        product_id: &str,
        delta: i64,
        kind: LedgerEntryKind,
        session: &SessionContext,
        note: Option<String>,
    ) -> LedgerResult<i64> {
        validate_adjustment(kind, delta)?;

        let txn = self.storage.begin_write()?;
        let entry = self.adjust_stock_in_txn(&txn, product_id, delta, kind, session.actor(), note)?;
        txn.commit()?;

        tracing::info!(
            product_id = %product_id,
            kind = %kind,
            delta,
            remaining = entry.remaining_stock,
            "Stock adjusted"
        );
        Ok(entry.remaining_stock)
    }

    /// Receive a delivery
    pub fn restock(
        &self,
        product_id: &str,
        quantity: i64,
        session: &SessionContext,
        note: Option<String>,
    ) -> LedgerResult<i64> {
        self.adjust_stock(product_id, quantity, LedgerEntryKind::Restock, session, note)
    }

    /// Stock change inside a caller-owned transaction
    pub(crate) fn adjust_stock_in_txn(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
        delta: i64,
        kind: LedgerEntryKind,
        actor: &str,
        note: Option<String>,
    ) -> LedgerResult<LedgerEntry> {
        let mut product = self
            .storage
            .get_product_txn(txn, product_id)?
            .ok_or_else(|| LedgerError::not_found(format!("Product {}", product_id)))?;

        let remaining = product.current_stock.checked_add(delta).ok_or_else(|| {
            LedgerError::invalid(format!(
                "Stock change {} for {} is out of range",
                delta, product.name
            ))
        })?;
        if remaining < 0 {
            return Err(LedgerError::InsufficientStock {
                product: product.name.clone(),
                requested: delta.saturating_neg(),
                available: product.current_stock,
            });
        }

        product.current_stock = remaining;
        product.updated_at = now_millis();
        self.storage.store_product(txn, &product)?;
        self.append_entry(txn, &product, kind, delta, actor, note)
    }

    /// Product lookup inside a caller-owned transaction
    pub(crate) fn get_product_in_txn(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
    ) -> LedgerResult<Option<Product>> {
        Ok(self.storage.get_product_txn(txn, product_id)?)
    }

    fn append_entry(
        &self,
        txn: &WriteTransaction,
        product: &Product,
        kind: LedgerEntryKind,
        delta: i64,
        actor: &str,
        note: Option<String>,
    ) -> LedgerResult<LedgerEntry> {
        let entry = LedgerEntry {
            id: new_id(),
            sequence: self.storage.next_ledger_sequence(txn)?,
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            kind,
            change_description: describe_change(kind, delta),
            delta,
            remaining_stock: product.current_stock,
            performed_by: actor.to_string(),
            note: note.filter(|n| !n.trim().is_empty()),
            timestamp: now_millis(),
        };
        self.storage.append_entry(txn, &entry)?;
        Ok(entry)
    }

    // ========== Queries ==========

    pub fn get_product(&self, product_id: &str) -> LedgerResult<Product> {
        with_read_retry("get_product", || self.storage.get_product(product_id))?
            .ok_or_else(|| LedgerError::not_found(format!("Product {}", product_id)))
    }

    /// All products, sorted by name
    pub fn list_products(&self) -> LedgerResult<Vec<Product>> {
        let mut products = with_read_retry("list_products", || self.storage.list_products())?;
        products.sort_by_key(|p| p.name.to_lowercase());
        Ok(products)
    }

    /// Products at or below their alert level, lowest stock first
    pub fn list_low_stock(&self) -> LedgerResult<Vec<Product>> {
        let mut products: Vec<Product> =
            with_read_retry("list_low_stock", || self.storage.list_products())?
                .into_iter()
                .filter(Product::is_low_stock)
                .collect();
        products.sort_by_key(|p| p.current_stock);
        Ok(products)
    }

    /// Ledger entries, newest first, optionally for one product
    pub fn list_entries(&self, product_id: Option<&str>) -> LedgerResult<Vec<LedgerEntry>> {
        let mut entries = with_read_retry("list_entries", || match product_id {
            Some(id) => self.storage.get_entries_for_product(id),
            None => self.storage.get_all_entries(),
        })?;
        entries.reverse();
        Ok(entries)
    }

    /// Replay a product's entries and compare with its stored stock
    pub fn audit_product(&self, product_id: &str) -> LedgerResult<StockAudit> {
        let entries = with_read_retry("audit_entries", || {
            self.storage.get_entries_for_product(product_id)
        })?;
        let current_stock = with_read_retry("audit_product", || self.storage.get_product(product_id))?
            .map(|p| p.current_stock);

        if entries.is_empty() && current_stock.is_none() {
            return Err(LedgerError::not_found(format!("Product {}", product_id)));
        }

        let mut replayed = 0i64;
        let mut snapshots_consistent = true;
        for entry in &entries {
            replayed += entry.delta;
            if entry.remaining_stock != replayed {
                snapshots_consistent = false;
            }
        }

        let consistent = snapshots_consistent && replayed == current_stock.unwrap_or(0);
        if !consistent {
            tracing::warn!(
                product_id = %product_id,
                replayed,
                current = ?current_stock,
                "Stock audit mismatch"
            );
        }

        Ok(StockAudit {
            product_id: product_id.to_string(),
            entry_count: entries.len(),
            replayed_stock: replayed,
            current_stock,
            snapshots_consistent,
            consistent,
        })
    }

    fn validate_category(&self, category: &str) -> LedgerResult<String> {
        let trimmed = category.trim();
        if !self.catalog.is_known(trimmed) {
            return Err(LedgerError::invalid(format!(
                "Unknown category '{}', expected one of: {}",
                trimmed,
                self.catalog.categories().join(", ")
            )));
        }
        Ok(self
            .catalog
            .categories()
            .into_iter()
            .find(|c| c.eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| trimmed.to_string()))
    }
}

fn validate_name(name: &str) -> LedgerResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid("name must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn validate_threshold(threshold: i64) -> LedgerResult<()> {
    if threshold < 0 {
        return Err(LedgerError::invalid(format!(
            "low_stock_threshold must be non-negative, got {}",
            threshold
        )));
    }
    Ok(())
}

/// Sign rules for manual adjustments
fn validate_adjustment(kind: LedgerEntryKind, delta: i64) -> LedgerResult<()> {
    let ok = match kind {
        LedgerEntryKind::InitialSetup => false,
        LedgerEntryKind::Update => delta != 0,
        LedgerEntryKind::Restock | LedgerEntryKind::VoidDelete => delta > 0,
        LedgerEntryKind::Sale => delta < 0,
    };
    if !ok {
        return Err(LedgerError::invalid(format!(
            "delta {} is not valid for a {} adjustment",
            delta, kind
        )));
    }
    Ok(())
}

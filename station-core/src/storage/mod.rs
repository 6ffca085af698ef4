//! redb-based durable store for the offline-first engine
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | product key | `Product` | Catalog cache |
//! | `cart` | line index | `CartLine` | Draft cart snapshot |
//! | `offline_orders` | order id | `OrderRecord` | Locally staged orders awaiting sync |
//!
//! Every collection write replaces the full snapshot (at-least-once,
//! idempotent persistence); only the offline-order queue supports keyed
//! deletes, used by the sync drain after a confirmed remote write.
//!
//! # Durability
//!
//! redb commits are persistent as soon as `commit()` returns and the
//! database file is always in a consistent state, which matters for POS
//! terminals that lose power without warning.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::{CartLine, OrderRecord, Product};
use shared::AppError;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Catalog cache: key = product id (falling back to name), value = JSON `Product`
const PRODUCTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("products");

/// Draft cart snapshot: key = line index, value = JSON `CartLine`
const CART_TABLE: TableDefinition<u32, &[u8]> = TableDefinition::new("cart");

/// Offline order queue: key = order id, value = JSON `OrderRecord`
const OFFLINE_ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("offline_orders");

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

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::storage(err.to_string())
    }
}

/// Durable store backed by redb
#[derive(Clone)]
pub struct StationStorage {
    db: Arc<Database>,
}

impl StationStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Create all tables so first reads never fail
    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(CART_TABLE)?;
            let _ = write_txn.open_table(OFFLINE_ORDERS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Catalog Cache ==========

    /// Load the full cached product set
    pub fn load_products(&self) -> StorageResult<Vec<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;

        let mut products = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let product: Product = serde_json::from_slice(value.value())?;
            products.push(product);
        }
        Ok(products)
    }

    /// Replace the cached product set with a fresh snapshot
    pub fn save_products(&self, products: &[Product]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(PRODUCTS_TABLE)?;

            // Collect-then-remove; redb guards borrow the table during iteration
            let old_keys: Vec<String> = table
                .iter()?
                .filter_map(|r| r.ok())
                .map(|(k, _)| k.value().to_string())
                .collect();
            for key in &old_keys {
                table.remove(key.as_str())?;
            }

            for product in products {
                let key = product.id.clone().unwrap_or_else(|| product.name.clone());
                let value = serde_json::to_vec(product)?;
                table.insert(key.as_str(), value.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Draft Cart Snapshot ==========

    /// Load the persisted draft cart
    pub fn load_cart(&self) -> StorageResult<Vec<CartLine>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CART_TABLE)?;

        let mut lines = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let line: CartLine = serde_json::from_slice(value.value())?;
            lines.push(line);
        }
        Ok(lines)
    }

    /// Replace the persisted draft cart with a fresh snapshot
    pub fn save_cart(&self, lines: &[CartLine]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CART_TABLE)?;

            let old_keys: Vec<u32> = table
                .iter()?
                .filter_map(|r| r.ok())
                .map(|(k, _)| k.value())
                .collect();
            for key in old_keys {
                table.remove(key)?;
            }

            for (index, line) in lines.iter().enumerate() {
                let value = serde_json::to_vec(line)?;
                table.insert(index as u32, value.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Offline Order Queue ==========

    /// Load every locally staged order, oldest first
    pub fn queued_orders(&self) -> StorageResult<Vec<OrderRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(OFFLINE_ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: OrderRecord = serde_json::from_slice(value.value())?;
            orders.push(order);
        }
        orders.sort_by_key(|o| o.timestamp);
        Ok(orders)
    }

    /// Stage an order for a later sync drain (upsert by id)
    pub fn enqueue_order(&self, order: &OrderRecord) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(OFFLINE_ORDERS_TABLE)?;
            let value = serde_json::to_vec(order)?;
            table.insert(order.id.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Remove a staged order after a confirmed remote write
    pub fn delete_queued_order(&self, id: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(OFFLINE_ORDERS_TABLE)?;
            table.remove(id)?;
        }
        write_txn.commit()?;
        tracing::debug!(order_id = %id, "Staged order removed from offline queue");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Pricing, Product};

    fn product(name: &str, price: i64) -> Product {
        Product {
            id: Some(format!("p-{name}")),
            name: name.to_string(),
            category: Some("Pizza".to_string()),
            pricing: Pricing::Single { price },
        }
    }

    fn order(id: &str, timestamp: i64) -> OrderRecord {
        OrderRecord {
            id: id.to_string(),
            products: vec![CartLine::paid("Cheese pizza", None, 300, 1)],
            total_amount: 300,
            delivery: 0,
            discount: 0,
            phone: None,
            timestamp,
            server_id: None,
            server_version: None,
        }
    }

    #[test]
    fn test_products_replace_all() {
        let storage = StationStorage::open_in_memory().unwrap();
        assert!(storage.load_products().unwrap().is_empty());

        storage
            .save_products(&[product("Cheese pizza", 300), product("Hot stuff", 550)])
            .unwrap();
        assert_eq!(storage.load_products().unwrap().len(), 2);

        // Saving again replaces the snapshot, it never appends
        storage.save_products(&[product("Cheese pizza", 320)]).unwrap();
        let products = storage.load_products().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].single_price(), Some(320));
    }

    #[test]
    fn test_cart_snapshot_roundtrip() {
        let storage = StationStorage::open_in_memory().unwrap();

        let lines = vec![
            CartLine::paid("Cheese pizza", Some("med".into()), 300, 2),
            CartLine::paid("Garlic bread", None, 90, 1),
        ];
        storage.save_cart(&lines).unwrap();
        assert_eq!(storage.load_cart().unwrap(), lines);

        storage.save_cart(&[]).unwrap();
        assert!(storage.load_cart().unwrap().is_empty());
    }

    #[test]
    fn test_offline_queue_delete_by_id() {
        let storage = StationStorage::open_in_memory().unwrap();

        storage.enqueue_order(&order("b", 2)).unwrap();
        storage.enqueue_order(&order("a", 1)).unwrap();
        storage.enqueue_order(&order("c", 3)).unwrap();

        // Oldest first regardless of key order
        let queued = storage.queued_orders().unwrap();
        assert_eq!(
            queued.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );

        storage.delete_queued_order("b").unwrap();
        let queued = storage.queued_orders().unwrap();
        assert_eq!(
            queued.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );

        // Deleting an unknown id is harmless
        storage.delete_queued_order("missing").unwrap();
    }

    #[test]
    fn test_enqueue_is_idempotent_by_id() {
        let storage = StationStorage::open_in_memory().unwrap();
        storage.enqueue_order(&order("a", 1)).unwrap();
        storage.enqueue_order(&order("a", 1)).unwrap();
        assert_eq!(storage.queued_orders().unwrap().len(), 1);
    }
}

//! Redb (Rust embedded database) backend for product documents.
//!
//! Redb is a pure Rust embedded key-value store with ACID transactions, so
//! a single file is all a deployment needs. Every mutating call runs in its
//! own write transaction and is durable once it returns.
//!
//! # Configuration Example
//! ```text
//! STORAGE_URI=redb:///var/lib/products/products.redb
//! ```

use crate::{StoreBackend, StoreError};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

/// Table holding JSON-encoded products keyed by id.
const PRODUCTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("products");

/// Redb backend implementation for persistent document storage.
///
/// # Thread Safety
/// The `Arc<Database>` wrapper allows safe sharing across threads.
/// Redb handles its own internal locking and MVCC.
pub struct RedbBackend {
    db: Arc<Database>,
}

impl RedbBackend {
    /// Open or create a Redb database at the given path.
    ///
    /// ```no_run
    /// use store::RedbBackend;
    ///
    /// let backend = RedbBackend::open("/tmp/products.redb").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(StoreError::backend)?;

        // Create the table up front so read transactions never miss it.
        let write_txn = db.begin_write().map_err(StoreError::backend)?;
        {
            let _table = write_txn
                .open_table(PRODUCTS_TABLE)
                .map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl StoreBackend for RedbBackend {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write().map_err(StoreError::backend)?;
        {
            let mut table = write_txn
                .open_table(PRODUCTS_TABLE)
                .map_err(StoreError::backend)?;
            table.insert(key, value).map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let read_txn = self.db.begin_read().map_err(StoreError::backend)?;
        let table = read_txn
            .open_table(PRODUCTS_TABLE)
            .map_err(StoreError::backend)?;

        let value = table.get(key).map_err(StoreError::backend)?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn replace(&self, key: &str, value: &[u8]) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write().map_err(StoreError::backend)?;
        let existed = {
            let mut table = write_txn
                .open_table(PRODUCTS_TABLE)
                .map_err(StoreError::backend)?;
            let previous = table.insert(key, value).map_err(StoreError::backend)?;
            previous.is_some()
        };

        if existed {
            write_txn.commit().map_err(StoreError::backend)?;
        } else {
            // The key was absent: roll back the speculative insert.
            write_txn.abort().map_err(StoreError::backend)?;
        }
        Ok(existed)
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write().map_err(StoreError::backend)?;
        let existed = {
            let mut table = write_txn
                .open_table(PRODUCTS_TABLE)
                .map_err(StoreError::backend)?;
            let removed = table.remove(key).map_err(StoreError::backend)?;
            removed.is_some()
        };
        write_txn.commit().map_err(StoreError::backend)?;
        Ok(existed)
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let read_txn = self.db.begin_read().map_err(StoreError::backend)?;
        let table = read_txn
            .open_table(PRODUCTS_TABLE)
            .map_err(StoreError::backend)?;

        for item in table.iter().map_err(StoreError::backend)? {
            let (_, value) = item.map_err(StoreError::backend)?;
            visitor(value.value())?;
        }
        Ok(())
    }
}

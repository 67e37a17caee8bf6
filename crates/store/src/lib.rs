//! Persistence gateway for product documents.
//!
//! [`ProductStore`] is the only component that touches storage. It owns a
//! [`StoreBackend`] (a plain key → bytes map) and stores each product as a
//! JSON document under its id. Out of the box it provides:
//!
//! - [`InMemoryBackend`] for tests and throwaway runs.
//! - [`RedbBackend`] for a durable single-file database (feature `backend-redb`, on by default).
//!
//! Identifiers arrive as raw path text. Text that does not parse as a
//! [`ProductId`] surfaces as [`StoreError::InvalidId`] rather than a storage
//! fault, so callers can treat it exactly like [`StoreError::NotFound`].
//!
//! ```
//! use product_crud::NewProduct;
//! use store::{BackendConfig, ProductStore};
//!
//! let store = ProductStore::new(&BackendConfig::in_memory()).unwrap();
//! let pen = store
//!     .create(NewProduct::new("Pen", 1.5, "Blue ink pen").unwrap())
//!     .unwrap();
//! assert_eq!(store.get_by_id(&pen.id.to_string()).unwrap(), pen);
//! ```

pub mod backend;

pub use backend::{BackendConfig, InMemoryBackend, StoreBackend};
#[cfg(feature = "backend-redb")]
pub use backend::RedbBackend;

use chrono::Utc;
use product_crud::{NewProduct, Product, ProductId, ProductPatch};

/// Errors surfaced by the persistence gateway.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("product {0} not found")]
    NotFound(String),
    #[error("invalid product id: {0:?}")]
    InvalidId(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("document codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("storage configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    /// True for the kinds a caller should report as "no such product".
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::InvalidId(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Product persistence over a pluggable backend.
pub struct ProductStore {
    backend: Box<dyn StoreBackend>,
}

impl ProductStore {
    /// Open the backend described by `config`.
    pub fn new(config: &BackendConfig) -> StoreResult<Self> {
        Ok(Self::with_backend(config.build()?))
    }

    /// Open the backend named by a storage connection string.
    pub fn open(uri: &str) -> StoreResult<Self> {
        Self::new(&BackendConfig::from_uri(uri)?)
    }

    /// Wrap an already-built backend (e.g., in-memory for tests).
    pub fn with_backend(backend: Box<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    /// Persist a validated draft under a newly assigned id.
    pub fn create(&self, draft: NewProduct) -> StoreResult<Product> {
        let product = Product::create(draft, Utc::now());
        self.backend
            .put(&product.id.to_string(), &encode(&product)?)?;
        tracing::debug!(id = %product.id, "product created");
        Ok(product)
    }

    pub fn get_by_id(&self, id: &str) -> StoreResult<Product> {
        let id = parse_id(id)?;
        self.load(&id)
    }

    /// All products, oldest first.
    pub fn list_all(&self) -> StoreResult<Vec<Product>> {
        let mut products = Vec::new();
        self.backend.scan(&mut |data| {
            products.push(decode(data)?);
            Ok(())
        })?;
        products.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(products)
    }

    /// Apply a validated patch and return the full updated record.
    ///
    /// A record deleted between the read and the write is reported as
    /// not found rather than resurrected.
    pub fn update(&self, id: &str, patch: ProductPatch) -> StoreResult<Product> {
        let id = parse_id(id)?;
        let mut product = self.load(&id)?;
        product.apply(patch, Utc::now());

        let key = id.to_string();
        if !self.backend.replace(&key, &encode(&product)?)? {
            return Err(StoreError::NotFound(key));
        }
        tracing::debug!(id = %id, "product updated");
        Ok(product)
    }

    pub fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        let id = parse_id(id)?;
        let key = id.to_string();
        if !self.backend.remove(&key)? {
            return Err(StoreError::NotFound(key));
        }
        tracing::debug!(id = %id, "product deleted");
        Ok(())
    }

    /// Flush backend buffers if supported.
    pub fn flush(&self) -> StoreResult<()> {
        self.backend.flush()
    }

    fn load(&self, id: &ProductId) -> StoreResult<Product> {
        let key = id.to_string();
        match self.backend.get(&key)? {
            Some(data) => decode(&data),
            None => Err(StoreError::NotFound(key)),
        }
    }
}

fn parse_id(raw: &str) -> StoreResult<ProductId> {
    raw.parse()
        .map_err(|_| StoreError::InvalidId(raw.to_string()))
}

fn encode(product: &Product) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(product)?)
}

fn decode(data: &[u8]) -> StoreResult<Product> {
    Ok(serde_json::from_slice(data)?)
}

use crate::StoreError;
use std::collections::HashMap;
use std::sync::RwLock;

/// Trait for a key-value storage backend holding encoded product documents.
/// This allows for different storage implementations (e.g., in-memory, Redb).
pub trait StoreBackend: Send + Sync {
    /// Insert or overwrite a document.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    /// Retrieve a document by key.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    /// Overwrite a document only if the key already exists.
    ///
    /// The existence check and the write happen atomically. Returns `false`
    /// when the key was absent and nothing was written.
    fn replace(&self, key: &str, value: &[u8]) -> Result<bool, StoreError>;
    /// Delete a document. Returns `false` when the key was absent.
    fn remove(&self, key: &str) -> Result<bool, StoreError>;
    /// Scan all documents in the backend, calling the visitor for each one.
    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError>;
    /// Flush any buffered writes to the backend.
    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Configuration for selecting and building a backend.
///
/// # Example
/// ```
/// use store::BackendConfig;
///
/// // In-memory (for testing)
/// let config = BackendConfig::in_memory();
///
/// // Redb (pure Rust, durable)
/// let config = BackendConfig::redb("/data/products.redb");
///
/// // From a storage connection string
/// let config = BackendConfig::from_uri("redb:///data/products.redb").unwrap();
/// assert_eq!(config, BackendConfig::redb("/data/products.redb"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BackendConfig {
    /// Use a Redb database file at `path`.
    ///
    /// Requires the `backend-redb` feature (enabled by default).
    Redb { path: String },
    /// Use an in-memory HashMap. Contents are lost on shutdown.
    #[default]
    InMemory,
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn redb<P: Into<String>>(path: P) -> Self {
        BackendConfig::Redb { path: path.into() }
    }

    /// Parse a storage connection string.
    ///
    /// * `memory` or `memory://` selects the in-memory backend.
    /// * `redb://<path>` or a bare `<path>` selects a Redb file.
    pub fn from_uri(uri: &str) -> Result<Self, StoreError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(StoreError::Config("storage uri is empty".to_string()));
        }

        if uri == "memory" || uri.starts_with("memory://") {
            return Ok(BackendConfig::InMemory);
        }

        let path = match uri.split_once("://") {
            Some(("redb", path)) => path,
            Some((scheme, _)) => {
                return Err(StoreError::Config(format!(
                    "unsupported storage scheme '{scheme}'"
                )))
            }
            None => uri,
        };

        if path.is_empty() {
            return Err(StoreError::Config(format!(
                "storage uri '{uri}' has no path"
            )));
        }

        Ok(BackendConfig::redb(path))
    }

    /// Build the backend based on the configuration.
    pub fn build(&self) -> Result<Box<dyn StoreBackend>, StoreError> {
        match self {
            BackendConfig::InMemory => Ok(Box::new(InMemoryBackend::new())),
            BackendConfig::Redb { path } => {
                #[cfg(feature = "backend-redb")]
                {
                    Ok(Box::new(RedbBackend::open(path)?))
                }
                #[cfg(not(feature = "backend-redb"))]
                {
                    let _ = path;
                    Err(StoreError::Config(
                        "redb backend disabled at compile time".to_string(),
                    ))
                }
            }
        }
    }
}

/// An in-memory backend using a `RwLock` around a `HashMap`.
#[derive(Default)]
pub struct InMemoryBackend {
    documents: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreBackend for InMemoryBackend {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.documents
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let guard = self
            .documents
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.get(key).cloned())
    }

    fn replace(&self, key: &str, value: &[u8]) -> Result<bool, StoreError> {
        // One write lock covers both the lookup and the overwrite.
        let mut guard = self
            .documents
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        match guard.get_mut(key) {
            Some(slot) => {
                *slot = value.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self
            .documents
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .remove(key)
            .is_some())
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let guard = self
            .documents
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        for value in guard.values() {
            visitor(value)?;
        }
        Ok(())
    }
}

/// The Redb backend implementation.
#[cfg(feature = "backend-redb")]
pub mod redb;

#[cfg(feature = "backend-redb")]
pub use self::redb::RedbBackend;

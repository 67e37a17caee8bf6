use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use std::sync::Arc;
use store::{ProductStore, StoreResult};

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Product store (shared across requests, opened once at startup)
    pub store: Arc<ProductStore>,
}

impl ServerState {
    /// Create new server state, opening the store named by `storage_uri`
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = ProductStore::open(&config.storage_uri)
            .map_err(|e| ServerError::Config(format!("cannot open product store: {e}")))?;
        Ok(Self::with_store(config, store))
    }

    /// Build state around an already-open store (e.g., in-memory for tests)
    pub fn with_store(config: ServerConfig, store: ProductStore) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }

    /// Run a store operation on the blocking pool.
    ///
    /// Backends such as redb do synchronous file I/O, which must stay off
    /// the async workers.
    pub async fn run_store<T, F>(&self, op: F) -> ServerResult<T>
    where
        F: FnOnce(&ProductStore) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || op(&store)).await?;
        Ok(result?)
    }
}

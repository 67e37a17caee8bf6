//! Product Server - HTTP REST API for the product catalog
//!
//! This crate exposes CRUD operations on products over JSON/HTTP, backed by
//! the `product-store` persistence gateway.
//!
//! # Features
//!
//! - **Envelopes**: every response is `{ success, data | message, ... }`
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging, panic catching
//! - **Configuration**: Environment variable and file-based configuration
//! - **Error Handling**: One error type, one place that maps it to a status code
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /api/health` - Liveness probe
//! - `GET /api/products` - List products
//! - `GET /api/products/{id}` - Get product by ID
//! - `POST /api/products` - Create product
//! - `PUT /api/products/{id}` - Update product
//! - `DELETE /api/products/{id}` - Delete product

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;

//! API route handlers
//!
//! Routes are organized by functionality:
//!
//! - `health`: Liveness check
//! - `products`: Product CRUD
//!
//! Every successful response uses the [`Envelope`] wrapper; failures are
//! rendered by [`ServerError`](crate::error::ServerError).

pub mod health;
pub mod products;

use crate::error::ServerError;
use axum::extract::OriginalUri;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Success envelope: `{ success: true, count?, message?, data? }`
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            count: None,
            message: None,
            data: Some(data),
        }
    }
}

impl<T> Envelope<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        Self {
            success: true,
            count: Some(items.len()),
            message: None,
            data: Some(items),
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            count: None,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// One entry of the endpoint listing served at `GET /`
#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

pub const ENDPOINTS: &[EndpointInfo] = &[
    EndpointInfo {
        method: "GET",
        path: "/api/products",
        description: "Get all products",
    },
    EndpointInfo {
        method: "GET",
        path: "/api/products/:id",
        description: "Get single product",
    },
    EndpointInfo {
        method: "POST",
        path: "/api/products",
        description: "Create new product",
    },
    EndpointInfo {
        method: "PUT",
        path: "/api/products/:id",
        description: "Update product",
    },
    EndpointInfo {
        method: "DELETE",
        path: "/api/products/:id",
        description: "Delete product",
    },
    EndpointInfo {
        method: "GET",
        path: "/api/health",
        description: "Health check",
    },
];

#[derive(Debug, Serialize)]
struct ApiInfo {
    success: bool,
    message: &'static str,
    version: &'static str,
    endpoints: &'static [EndpointInfo],
}

/// API information (GET /)
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Welcome to Product CRUD API",
///   "version": "0.1.0",
///   "endpoints": [{ "method": "GET", "path": "/api/products", "description": "Get all products" }]
/// }
/// ```
pub async fn api_info() -> impl IntoResponse {
    Json(ApiInfo {
        success: true,
        message: "Welcome to Product CRUD API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS,
    })
}

/// Fallback for any method/path combination without a handler
pub async fn not_found(OriginalUri(uri): OriginalUri) -> ServerError {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    ServerError::RouteNotFound(path)
}

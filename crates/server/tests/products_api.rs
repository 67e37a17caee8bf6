//! Integration tests for the product API
//!
//! These drive the real router (middleware included) against an in-memory
//! store, one request at a time.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use store::{InMemoryBackend, ProductStore, StoreBackend, StoreError};
use tower::ServiceExt;

fn app_with(backend: Box<dyn StoreBackend>) -> Router {
    let store = ProductStore::with_backend(backend);
    let state = ServerState::with_store(ServerConfig::default(), store);
    build_router(Arc::new(state))
}

fn test_app() -> Router {
    app_with(Box::new(InMemoryBackend::new()))
}

/// Backend whose every call fails, as a lost disk would.
struct OfflineBackend;

impl StoreBackend for OfflineBackend {
    fn put(&self, _key: &str, _value: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::backend("disk offline at /var/lib/products"))
    }

    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::backend("disk offline at /var/lib/products"))
    }

    fn replace(&self, _key: &str, _value: &[u8]) -> Result<bool, StoreError> {
        Err(StoreError::backend("disk offline at /var/lib/products"))
    }

    fn remove(&self, _key: &str) -> Result<bool, StoreError> {
        Err(StoreError::backend("disk offline at /var/lib/products"))
    }

    fn scan(
        &self,
        _visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        Err(StoreError::backend("disk offline at /var/lib/products"))
    }
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: &str,
    body: String,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, json) = send(app, Method::POST, "/api/products", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {json}");
    json["data"].clone()
}

fn timestamp(value: &Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

fn error_fields(json: &Value) -> Vec<String> {
    json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();
    let (status, json) = send(&app, Method::GET, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], json!(true));
    assert_eq!(json["message"], json!("Product CRUD API is running"));
    timestamp(&json["timestamp"]);
}

#[tokio::test]
async fn test_api_info_lists_endpoints() {
    let app = test_app();
    let (status, json) = send(&app, Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], json!(true));
    assert_eq!(json["message"], json!("Welcome to Product CRUD API"));

    let endpoints = json["endpoints"].as_array().unwrap();
    assert_eq!(endpoints.len(), 6);
    assert!(endpoints
        .iter()
        .any(|e| e["method"] == json!("DELETE") && e["path"] == json!("/api/products/:id")));
}

#[tokio::test]
async fn test_pen_lifecycle() {
    let app = test_app();

    let created = create(
        &app,
        json!({ "name": "Pen", "price": 1.5, "description": "Blue ink pen" }),
    )
    .await;
    assert_eq!(created["name"], json!("Pen"));
    assert_eq!(created["price"].as_f64(), Some(1.5));
    let id = created["id"].as_str().unwrap().to_string();
    let uri = format!("/api/products/{id}");

    let (status, json) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], json!(true));
    assert_eq!(json["data"], created);

    let (status, json) = send(&app, Method::PUT, &uri, Some(json!({ "price": 2.0 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["price"].as_f64(), Some(2.0));
    assert_eq!(json["data"]["name"], json!("Pen"));

    let (status, json) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], json!(true));
    assert_eq!(json["message"], json!("Product deleted successfully"));

    let (status, json) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], json!(false));
    assert_eq!(json["message"], json!("Product not found"));
}

#[tokio::test]
async fn test_create_trims_text_fields() {
    let app = test_app();
    let created = create(
        &app,
        json!({ "name": "  Notebook ", "price": "3.25", "description": " A5, dotted " }),
    )
    .await;

    assert_eq!(created["name"], json!("Notebook"));
    assert_eq!(created["description"], json!("A5, dotted"));
    assert_eq!(created["price"].as_f64(), Some(3.25));
    assert_eq!(created["createdAt"], created["updatedAt"]);
}

#[tokio::test]
async fn test_create_reports_each_missing_field() {
    let app = test_app();

    let (status, json) = send(&app, Method::POST, "/api/products", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], json!(false));
    assert_eq!(error_fields(&json), vec!["name", "price", "description"]);

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Pen", "description": "Blue ink pen" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&json), vec!["price"]);
    assert_eq!(json["errors"][0]["message"], json!("Product price is required"));
}

#[tokio::test]
async fn test_create_rejects_out_of_range_values() {
    let app = test_app();
    let (status, json) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({
            "name": "n".repeat(101),
            "price": -1,
            "description": "   ",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let messages: Vec<_> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Product name cannot exceed 100 characters",
            "Price cannot be negative",
            "Product description is required",
        ]
    );

    let (status, json) = send(&app, Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], json!(0));
}

#[tokio::test]
async fn test_update_negative_price_is_rejected() {
    let app = test_app();
    let created = create(
        &app,
        json!({ "name": "Pen", "price": 1.5, "description": "Blue ink pen" }),
    )
    .await;
    let uri = format!("/api/products/{}", created["id"].as_str().unwrap());

    let (status, json) = send(&app, Method::PUT, &uri, Some(json!({ "price": -5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&json), vec!["price"]);

    let (_, json) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(json["data"]["price"].as_f64(), Some(1.5));
}

#[tokio::test]
async fn test_update_name_leaves_other_fields() {
    let app = test_app();
    let created = create(
        &app,
        json!({ "name": "Pen", "price": 1.5, "description": "Blue ink pen" }),
    )
    .await;
    let uri = format!("/api/products/{}", created["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "name": "Gel Pen" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let fetched = &json["data"];
    assert_eq!(fetched["name"], json!("Gel Pen"));
    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(fetched["price"], created["price"]);
    assert_eq!(fetched["description"], created["description"]);
    assert_eq!(fetched["createdAt"], created["createdAt"]);
    assert!(timestamp(&fetched["updatedAt"]) > timestamp(&created["updatedAt"]));
}

#[tokio::test]
async fn test_update_missing_product() {
    let app = test_app();
    let uri = format!("/api/products/{}", uuid::Uuid::new_v4());

    let (status, json) = send(&app, Method::PUT, &uri, Some(json!({ "name": "Ghost" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], json!("Product not found"));

    // The body is checked before the lookup
    let (status, _) = send(&app, Method::PUT, &uri, Some(json!({ "price": -1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_twice() {
    let app = test_app();
    let created = create(
        &app,
        json!({ "name": "Pen", "price": 1.5, "description": "Blue ink pen" }),
    )
    .await;
    let uri = format!("/api/products/{}", created["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], json!("Product not found"));
}

#[tokio::test]
async fn test_list_counts_after_deletes() {
    let app = test_app();

    let (status, json) = send(&app, Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], json!(0));
    assert_eq!(json["data"], json!([]));

    let mut ids = Vec::new();
    for i in 0..4 {
        let created = create(
            &app,
            json!({ "name": format!("Item {i}"), "price": i, "description": "Stock item" }),
        )
        .await;
        ids.push(created["id"].as_str().unwrap().to_string());
    }
    for id in &ids[..3] {
        let (status, _) = send(&app, Method::DELETE, &format!("/api/products/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = send(&app, Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], json!(1));
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["id"], json!(ids[3]));
}

#[tokio::test]
async fn test_malformed_id_is_not_found() {
    let app = test_app();

    for method in [Method::GET, Method::DELETE] {
        let (status, json) = send(&app, method, "/api/products/12345", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], json!("Product not found"));
    }

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/products/12345",
        Some(json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_routes_echo_path() {
    let app = test_app();

    let (status, json) = send(&app, Method::GET, "/api/widgets?limit=2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], json!(false));
    assert_eq!(json["message"], json!("Route /api/widgets?limit=2 not found"));

    let (status, json) = send(&app, Method::PATCH, "/api/products", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], json!("Route /api/products not found"));

    let (status, json) = send(&app, Method::POST, "/api/health", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], json!("Route /api/health not found"));
}

#[tokio::test]
async fn test_malformed_json_body() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/products")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": \"Pen\","))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["success"], json!(false));
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON payload"));
}

#[tokio::test]
async fn test_non_object_body() {
    let app = test_app();
    let (status, json) = send(&app, Method::POST, "/api/products", Some(json!([1, 2]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&json), vec!["body"]);
}

#[tokio::test]
async fn test_request_id_header() {
    let app = test_app();

    let request = Request::builder()
        .uri("/api/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_undecodable_id_is_not_found() {
    let app = test_app();

    for method in [Method::GET, Method::DELETE] {
        let (status, json) = send(&app, method, "/api/products/%FF", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["success"], json!(false));
        assert_eq!(json["message"], json!("Product not found"));
    }

    let (status, json) = send(
        &app,
        Method::PUT,
        "/api/products/%FF",
        Some(json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], json!("Product not found"));
}

#[tokio::test]
async fn test_form_encoded_create_and_update() {
    let app = test_app();
    let form = "application/x-www-form-urlencoded";

    let (status, json) = send_raw(
        &app,
        Method::POST,
        "/api/products",
        form,
        "name=Pen&price=1.5&description=Blue+ink+pen".to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {json}");
    assert_eq!(json["data"]["name"], json!("Pen"));
    assert_eq!(json["data"]["price"].as_f64(), Some(1.5));
    assert_eq!(json["data"]["description"], json!("Blue ink pen"));

    let uri = format!("/api/products/{}", json["data"]["id"].as_str().unwrap());
    let (status, json) = send_raw(&app, Method::PUT, &uri, form, "price=2".to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["price"].as_f64(), Some(2.0));
    assert_eq!(json["data"]["name"], json!("Pen"));

    let (status, json) = send_raw(&app, Method::PUT, &uri, form, "price=-1".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&json), vec!["price"]);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = test_app();
    let description = "x".repeat(2 * 1024 * 1024);
    let body = json!({ "name": "Pen", "price": 1, "description": description }).to_string();

    let (status, json) =
        send_raw(&app, Method::POST, "/api/products", "application/json", body).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["success"], json!(false));
    assert_eq!(json["message"], json!("Request body too large"));
}

#[tokio::test]
async fn test_storage_failure_hides_cause() {
    let app = app_with(Box::new(OfflineBackend));

    let (status, json) = send(&app, Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], json!(false));
    assert_eq!(json["message"], json!("Internal server error"));
    assert!(json.get("errors").is_none());
    assert!(!json.to_string().contains("disk offline"));

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Pen", "price": 1.5, "description": "Blue ink pen" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], json!("Internal server error"));
}

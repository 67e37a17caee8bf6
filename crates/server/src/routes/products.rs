//! Product CRUD handlers.
//!
//! Each handler extracts its parameters, validates the body where there is
//! one, makes exactly one store call and wraps the result in an
//! [`Envelope`]. Errors bubble up as [`ServerError`] and are rendered in
//! one place.

use super::Envelope;
use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequest, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Form, Json};
use product_crud::{NewProduct, ProductPatch};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request body of a create or update, as a JSON value.
///
/// JSON bodies are taken as-is. Form-encoded bodies become an object of
/// strings, which the validators cast like any other string input.
pub struct ProductBody(pub Value);

impl<S> FromRequest<S> for ProductBody
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE));

        if is_form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state).await?;
            let object: Map<String, Value> = fields
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            Ok(Self(Value::Object(object)))
        } else {
            let Json(body) = Json::<Value>::from_request(req, state).await?;
            Ok(Self(body))
        }
    }
}

/// Resolve the `{id}` segment. A segment axum cannot decode names no product.
fn product_id(path: Result<Path<String>, PathRejection>) -> ServerResult<String> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "undecodable product id");
            Err(ServerError::ProductNotFound)
        }
    }
}

/// List all products
pub async fn list_products(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let products = state.run_store(|store| store.list_all()).await?;
    Ok(Json(Envelope::list(products)))
}

/// Get a product by id
pub async fn get_product(
    State(state): State<Arc<ServerState>>,
    path: Result<Path<String>, PathRejection>,
) -> ServerResult<impl IntoResponse> {
    let id = product_id(path)?;
    let product = state.run_store(move |store| store.get_by_id(&id)).await?;
    Ok(Json(Envelope::data(product)))
}

/// Create a product from a complete body
pub async fn create_product(
    State(state): State<Arc<ServerState>>,
    ProductBody(body): ProductBody,
) -> ServerResult<impl IntoResponse> {
    let draft = NewProduct::from_json(&body)?;
    let product = state.run_store(move |store| store.create(draft)).await?;

    tracing::info!(id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(Envelope::data(product))))
}

/// Update the supplied fields of a product
///
/// The body is validated before the lookup, so an invalid body is a 400
/// even when the id does not exist.
pub async fn update_product(
    State(state): State<Arc<ServerState>>,
    path: Result<Path<String>, PathRejection>,
    ProductBody(body): ProductBody,
) -> ServerResult<impl IntoResponse> {
    let patch = ProductPatch::from_json(&body)?;
    let id = product_id(path)?;
    let product = state
        .run_store(move |store| store.update(&id, patch))
        .await?;

    tracing::info!(id = %product.id, "Product updated");
    Ok(Json(Envelope::data(product)))
}

/// Delete a product
pub async fn delete_product(
    State(state): State<Arc<ServerState>>,
    path: Result<Path<String>, PathRejection>,
) -> ServerResult<impl IntoResponse> {
    let id = product_id(path)?;
    let deleted_id = id.clone();
    state
        .run_store(move |store| store.delete_by_id(&id))
        .await?;

    tracing::info!(id = %deleted_id, "Product deleted");
    Ok(Json(Envelope::message("Product deleted successfully")))
}

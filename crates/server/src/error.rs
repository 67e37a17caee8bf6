use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::BoxError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use product_crud::{FieldViolation, ValidationError};
use serde::{Deserialize, Serialize};
use store::StoreError;

pub type ServerResult<T> = Result<T, ServerError>;

/// Message returned for every 5xx; the cause only goes to the log.
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Validation failed")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Request timed out")]
    Timeout,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Route {0} not found")]
    RouteNotFound(String),

    #[error("Storage error: {0}")]
    Storage(StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure envelope: `{ success: false, message, errors? }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldViolation>>,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) | ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::ProductNotFound | ServerError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ServerError::Storage(_) | ServerError::Internal(_) | ServerError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable error code, used in logs
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::Validation(_) => "VALIDATION_ERROR",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ServerError::Timeout => "TIMEOUT",
            ServerError::ProductNotFound => "PRODUCT_NOT_FOUND",
            ServerError::RouteNotFound(_) => "ROUTE_NOT_FOUND",
            ServerError::Storage(_) => "STORAGE_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
        }
    }

    fn into_envelope(self) -> ErrorResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
            return ErrorResponse {
                success: false,
                message: INTERNAL_MESSAGE.to_string(),
                errors: None,
            };
        }

        tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        let message = self.to_string();
        let errors = match self {
            ServerError::Validation(err) => Some(err.into_violations()),
            _ => None,
        };
        ErrorResponse {
            success: false,
            message,
            errors,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.into_envelope())).into_response()
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            ServerError::ProductNotFound
        } else {
            ServerError::Storage(err)
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ServerError::PayloadTooLarge;
        }
        ServerError::BadRequest(format!("Invalid JSON payload: {}", rejection.body_text()))
    }
}

impl From<FormRejection> for ServerError {
    fn from(rejection: FormRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ServerError::PayloadTooLarge;
        }
        ServerError::BadRequest(format!("Invalid form payload: {}", rejection.body_text()))
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("storage task failed: {err}"))
    }
}

/// Map an error from the timeout middleware onto the envelope.
pub async fn middleware_error(err: BoxError) -> ServerError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ServerError::Timeout
    } else {
        ServerError::Internal(format!("middleware failed: {err}"))
    }
}

//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Order Service                      │
//! │                                                                         │
//! │  Handler: Result<Json<T>, ApiError>                                     │
//! │         │                                                               │
//! │         ├── ValidationError ──► CoreError ──┐                           │
//! │         │                                   │                           │
//! │         ├── DbError ────────────────────────┼──► EngineError ──► ApiError│
//! │         │                                   │                           │
//! │         └── Auth failure ───────────────────┴──────────────────► ApiError│
//! │                                                                         │
//! │  Client receives:                                                       │
//! │  HTTP 422                                                               │
//! │  {                                                                      │
//! │    "code": "INSUFFICIENT_STOCK",                                        │
//! │    "message": "Insufficient stock for bolts: available 3, requested 5", │
//! │    "details": { "product": "bolts", "available": 3, "requested": 5 }    │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use stockline_core::{CoreError, ValidationError};
use stockline_db::DbError;

use crate::engine::EngineError;

/// Error body returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Structured context for the failure, when there is any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Unique name or submission key already taken (409)
    Duplicate,

    /// Not enough stock for a line (422)
    InsufficientStock,

    /// Status change not allowed (422)
    InvalidTransition,

    /// Write conflict persisted through every retry (409)
    ConflictRetryable,

    /// Missing or invalid credentials (401)
    Unauthorized,

    /// Authenticated but not allowed (403)
    Forbidden,

    /// Store failed or timed out; nothing was changed (503)
    StoreUnavailable,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub const fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Duplicate | ErrorCode::ConflictRetryable => StatusCode::CONFLICT,
            ErrorCode::InsufficientStock | ErrorCode::InvalidTransition => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::CustomerNotFound(name) => ApiError::not_found("Customer", &name),
            CoreError::ProductNotFound(name) => ApiError::not_found("Product", &name),
            CoreError::OrderNotFound(id) => ApiError::not_found("Order", &id),
            CoreError::InvalidLineItem { line, .. } => {
                ApiError::validation(message).with_details(json!({ "line": line }))
            }
            CoreError::InsufficientStock {
                product,
                available,
                requested,
            } => ApiError::new(ErrorCode::InsufficientStock, message).with_details(json!({
                "product": product,
                "available": available,
                "requested": requested,
            })),
            CoreError::InvalidTransition { order_id, from, to } => {
                ApiError::new(ErrorCode::InvalidTransition, message).with_details(json!({
                    "orderId": order_id,
                    "from": from,
                    "to": to,
                }))
            }
            CoreError::UnknownStatus(_) => ApiError::validation(message),
            // Tiers only arrive from stored customer rows, never from a request.
            CoreError::UnknownTier(tier) => {
                tracing::error!(tier = %tier, "Stored customer has an unknown tier");
                ApiError::internal("Customer record is corrupt")
            }
            CoreError::Validation(ValidationError::Duplicate { .. }) => {
                ApiError::new(ErrorCode::Duplicate, message)
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        CoreError::from(err).into()
    }
}

/// Converts database errors to API errors.
///
/// Store internals are logged, never sent to the client.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Duplicate,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Domain(e) => e.into(),
            DbError::Conflict(e) => {
                tracing::warn!("Write conflict: {}", e);
                ApiError::new(ErrorCode::ConflictRetryable, "The store is busy, retry the request")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::StoreUnavailable, "Database pool exhausted")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::new(ErrorCode::StoreUnavailable, "Database operation failed")
            }
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Core(e) => e.into(),
            EngineError::ConflictRetryable { attempts } => ApiError::new(
                ErrorCode::ConflictRetryable,
                format!("Write conflict persisted after {} attempts, retry the request", attempts),
            ),
            EngineError::StoreUnavailable(reason) => {
                tracing::error!("Store unavailable: {}", reason);
                ApiError::new(
                    ErrorCode::StoreUnavailable,
                    "The store is unavailable; no changes were made",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

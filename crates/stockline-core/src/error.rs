//! # Error Types
//!
//! Domain-specific error types for stockline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockline-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule failures                          │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  stockline-db errors                                                    │
//! │  └── DbError          - Store failures (busy, unique, pool, ...)        │
//! │                                                                         │
//! │  order-service errors                                                   │
//! │  ├── EngineError      - Core + Db + retry exhaustion                    │
//! │  └── ApiError         - What clients see (serialized)                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → ApiError → Client    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// Every variant is user-displayable and carries the identifiers an operator
/// needs to correct the request.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// A requested line is malformed (zero quantity, discount out of range).
    ///
    /// `line` is the zero-based position in the submission.
    #[error("Invalid line item #{line}: {reason}")]
    InvalidLineItem { line: usize, reason: String },

    /// Not enough on-hand stock for a line.
    ///
    /// ## User Workflow
    /// ```text
    /// Place order (bolts × 50)
    ///      │
    ///      ▼
    /// Conditional decrement fails, re-read: available = 30
    ///      │
    ///      ▼
    /// InsufficientStock { product: "bolts", available: 30, requested: 50 }
    ///      │
    ///      ▼
    /// UI shows: "Only 30 bolts in stock"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// The requested status change is not allowed.
    #[error("Order {order_id} cannot move from '{from}' to '{to}'")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Unknown customer tier: {0}")]
    UnknownTier(String),

    #[error("Unknown order status: {0}")]
    UnknownStatus(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "steel bolts".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for steel bolts: available 3, requested 5"
        );

        let err = CoreError::InvalidTransition {
            order_id: "o-1".to_string(),
            from: OrderStatus::Placed,
            to: OrderStatus::Placed,
        };
        assert_eq!(err.to_string(), "Order o-1 cannot move from 'Placed' to 'Placed'");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: name is required");
    }
}

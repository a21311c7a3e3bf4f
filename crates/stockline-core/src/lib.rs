//! # stockline-core: Pure Business Logic for Stockline
//!
//! Pricing, fulfillment rules, validation and the domain types shared by the
//! store layer and the order service. Nothing in this crate performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Stockline Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  order-service (axum)                           │   │
//! │  │   /orders ──► Placement Engine    /orders/:id/status ──► FSM    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockline-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌────────────┐         │   │
//! │  │   │  types  │  │  money  │  │ pricing │  │ fulfillment│         │   │
//! │  │   │ Product │  │  Money  │  │  tiers  │  │  statuses  │         │   │
//! │  │   │  Order  │  │Discount │  │LineCost │  │ transition │         │   │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └────────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               stockline-db (SQLite store)                       │   │
//! │  │     repositories, conditional decrement, placement transaction  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Order, ...)
//! - [`money`] - Money in integer cents
//! - [`pricing`] - Tier price selection and line cost
//! - [`fulfillment`] - Order status transitions
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockline_core::money::Money;
//! use stockline_core::types::DiscountRate;
//!
//! let gross = Money::from_cents(99);
//! let net = gross.apply_discount(DiscountRate::from_bps(1250));
//!
//! // 12.375 cents of discount rounds to 12
//! assert_eq!(net.cents(), 87);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fulfillment;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{price_line, unit_price, LineCost};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines in one placement submission.
pub const MAX_LINES_PER_SUBMISSION: usize = 100;

/// Page size for `listOrders` when the caller gives none.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Largest page size `listOrders` will serve.
pub const MAX_PAGE_LIMIT: i64 = 500;

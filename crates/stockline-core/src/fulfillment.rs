//! # Fulfillment State Machine
//!
//! Governs which status changes warehouse staff may apply to an order record.
//!
//! ## States
//! ```text
//!            ┌───────────────────────────────────────────────────────┐
//!            │                                                       │
//!   Placed ──┼──► Preparing For Transit ──► Dispatched ──► Delivered │
//!     ▲      │            ▲                     ▲              ▲     │
//!     └──────┴────────────┴─────────────────────┴──────────────┘     │
//!            │       any state ──► Cannot be processed               │
//!            └───────────────────────────────────────────────────────┘
//! ```
//!
//! The operator names the target explicitly, and any named state may be
//! targeted from any other. The one rejected request is re-entering the
//! current state: a no-op usually means the operator picked the wrong order,
//! so it surfaces as [`CoreError::InvalidTransition`] instead of succeeding
//! silently.

use crate::error::{CoreError, CoreResult};
use crate::types::OrderStatus;

impl OrderStatus {
    /// `Delivered` and `Cannot be processed` end the normal flow.
    ///
    /// Informational: terminal states can still be overwritten by an explicit
    /// operator correction.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::CannotBeProcessed)
    }

    /// Whether `self -> target` is an allowed change.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        *self != target
    }
}

/// Validates a status change for `order_id` and returns the new status.
///
/// ## Example
/// ```rust
/// use stockline_core::fulfillment::transition;
/// use stockline_core::types::OrderStatus;
///
/// assert_eq!(
///     transition("o-1", OrderStatus::Placed, OrderStatus::Dispatched).unwrap(),
///     OrderStatus::Dispatched
/// );
/// assert!(transition("o-1", OrderStatus::Placed, OrderStatus::Placed).is_err());
/// ```
pub fn transition(order_id: &str, current: OrderStatus, target: OrderStatus) -> CoreResult<OrderStatus> {
    if !current.can_transition_to(target) {
        return Err(CoreError::InvalidTransition {
            order_id: order_id.to_string(),
            from: current,
            to: target,
        });
    }

    Ok(target)
}

//! # Order Engine
//!
//! Orchestrates placement and fulfillment on top of the store, adding the
//! policies the store leaves to its caller: input validation, bounded retry
//! on write conflicts, and a timeout around every store call.
//!
//! ## Failure Handling
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  attempt 1 ──► store call (under store_timeout)                         │
//! │                 │                                                       │
//! │                 ├── Ok ─────────────────────────────► done              │
//! │                 ├── business error ─────────────────► EngineError::Core │
//! │                 ├── timeout ────────────────────────► StoreUnavailable  │
//! │                 └── Conflict ──► sleep(backoff × n) ──► attempt n + 1   │
//! │                                                                         │
//! │  after max_attempts conflicts ──────────────────────► ConflictRetryable │
//! │                                                                         │
//! │  A timed-out or failed transaction is dropped uncommitted, so every     │
//! │  failure path leaves stock, counters and ledger as they were.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod fulfillment;
pub mod placement;

use std::future::Future;
use std::time::Duration;

use stockline_core::{CoreError, ValidationError};
use stockline_db::DbError;
use thiserror::Error;

pub use fulfillment::FulfillmentService;
pub use placement::PlacementEngine;

/// Engine failures.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Business rule failure; user-displayable.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store kept reporting write conflicts.
    #[error("Write conflict persisted after {attempts} attempts")]
    ConflictRetryable { attempts: u32 },

    /// The store failed or timed out. Nothing was committed.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Core(err.into())
    }
}

impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(e) => EngineError::Core(e),
            DbError::Conflict(_) => EngineError::ConflictRetryable { attempts: 1 },
            DbError::UniqueViolation { field, value } => {
                EngineError::Core(ValidationError::Duplicate { field, value }.into())
            }
            DbError::NotFound { entity, id } => EngineError::Core(match entity.as_str() {
                "Customer" => CoreError::CustomerNotFound(id),
                "Product" => CoreError::ProductNotFound(id),
                _ => CoreError::OrderNotFound(id),
            }),
            other => EngineError::StoreUnavailable(other.to_string()),
        }
    }
}

/// Timeout and retry policy shared by the engine services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Upper bound on one store call.
    pub store_timeout: Duration,
    /// Attempts before a write conflict is surfaced.
    pub max_attempts: u32,
    /// Base delay between attempts; attempt `n` waits `backoff × n`.
    pub backoff: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            store_timeout: Duration::from_secs(10),
            max_attempts: 5,
            backoff: Duration::from_millis(25),
        }
    }
}

impl EngineSettings {
    pub(crate) fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

/// Runs one store call under the configured timeout.
///
/// On timeout the call's future is dropped, which rolls back any open
/// transaction it holds.
pub(crate) async fn timed<T, F>(settings: &EngineSettings, op: &'static str, call: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    match tokio::time::timeout(settings.store_timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(op, timeout_ms = settings.store_timeout.as_millis() as u64, "Store call timed out");
            Err(DbError::TransactionFailed(format!("{op} timed out")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_classification() {
        assert!(matches!(
            EngineError::from(DbError::Domain(CoreError::ProductNotFound("x".into()))),
            EngineError::Core(CoreError::ProductNotFound(_))
        ));
        assert!(matches!(
            EngineError::from(DbError::not_found("Order", "o-1")),
            EngineError::Core(CoreError::OrderNotFound(id)) if id == "o-1"
        ));
        assert!(matches!(
            EngineError::from(DbError::conflict("busy")),
            EngineError::ConflictRetryable { .. }
        ));
        assert!(matches!(
            EngineError::from(DbError::PoolExhausted),
            EngineError::StoreUnavailable(_)
        ));
    }

    #[test]
    fn test_backoff_grows_linearly() {
        let settings = EngineSettings {
            backoff: Duration::from_millis(10),
            ..Default::default()
        };
        assert_eq!(settings.backoff_for(1), Duration::from_millis(10));
        assert_eq!(settings.backoff_for(3), Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_timed_maps_elapsed_to_store_failure() {
        let settings = EngineSettings {
            store_timeout: Duration::from_millis(10),
            ..Default::default()
        };

        let result: Result<(), DbError> = timed(&settings, "sleep", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(DbError::TransactionFailed(_))));
        assert!(matches!(
            EngineError::from(result.unwrap_err()),
            EngineError::StoreUnavailable(_)
        ));
    }
}

//! Fulfillment status updates and order reads.
//!
//! A status update reads the current status, checks the transition, then
//! writes with a compare-and-set on that status. Losing the race to another
//! update means re-reading and checking again.

use tracing::{debug, info, instrument, warn};

use stockline_core::fulfillment::transition;
use stockline_core::{CoreError, Order, OrderStatus, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use stockline_db::{DbError, OrderFilter, OrderRepository};

use super::{timed, EngineError, EngineSettings};

/// Status changes and ledger reads.
#[derive(Debug, Clone)]
pub struct FulfillmentService {
    repo: OrderRepository,
    settings: EngineSettings,
}

impl FulfillmentService {
    pub fn new(repo: OrderRepository, settings: EngineSettings) -> Self {
        FulfillmentService { repo, settings }
    }

    /// Moves an order to `target` and returns the updated record.
    ///
    /// `target` accepts the display label (`"Preparing For Transit"`) or the
    /// storage form (`"preparing_for_transit"`). Stock and counters are
    /// never touched.
    #[instrument(skip(self))]
    pub async fn update_status(&self, order_id: &str, target: &str) -> Result<Order, EngineError> {
        let target: OrderStatus = target.parse()?;

        let mut attempt = 1;
        loop {
            let current = self.get_order(order_id).await?;
            transition(order_id, current.status, target)?;

            let result = timed(
                &self.settings,
                "update_status",
                self.repo.update_status_if(order_id, current.status, target),
            )
            .await;

            match result {
                Ok(Some(order)) => {
                    if current.status.is_terminal() {
                        warn!(order_id = %order_id, from = %current.status, to = %target, "Reopened an order from a terminal status");
                    }
                    info!(order_id = %order_id, from = %current.status, to = %target, "Order status updated");
                    return Ok(order);
                }
                Ok(None) | Err(DbError::Conflict(_)) if attempt < self.settings.max_attempts => {
                    debug!(order_id = %order_id, attempt, "Status moved underneath us, re-reading");
                    tokio::time::sleep(self.settings.backoff_for(attempt)).await;
                    attempt += 1;
                }
                Ok(None) | Err(DbError::Conflict(_)) => {
                    warn!(order_id = %order_id, attempts = attempt, "Status update conflicts exhausted");
                    return Err(EngineError::ConflictRetryable { attempts: attempt });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Lists order records. `limit` defaults to [`DEFAULT_PAGE_LIMIT`] and
    /// is capped at [`MAX_PAGE_LIMIT`].
    pub async fn list_orders(
        &self,
        filter: &OrderFilter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Order>, EngineError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        let offset = offset.unwrap_or(0).max(0);

        Ok(timed(&self.settings, "list_orders", self.repo.list(filter, limit, offset)).await?)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order, EngineError> {
        timed(&self.settings, "get_order", self.repo.get_by_id(order_id))
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()).into())
    }

    /// Removes an order record. Stock and counters are left as they are.
    pub async fn delete_order(&self, order_id: &str) -> Result<(), EngineError> {
        timed(&self.settings, "delete_order", self.repo.delete(order_id)).await?;
        info!(order_id = %order_id, "Order deleted");
        Ok(())
    }
}

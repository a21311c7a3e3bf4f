//! # Placement Unit of Work
//!
//! Writes one multi-line submission as a single SQLite transaction.
//!
//! ## Transaction Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   │                                                                     │
//! │   ├── INSERT order_submissions (key) ON CONFLICT DO NOTHING             │
//! │   │     └── 0 rows: key already committed                               │
//! │   │           ├── same customer and lines → replay stored lines         │
//! │   │           └── otherwise → Duplicate                                 │
//! │   │                                                                     │
//! │   ├── UPDATE customers SET orders_made += lines  RETURNING tier         │
//! │   │     └── 0 rows: CustomerNotFound                                    │
//! │   │                                                                     │
//! │   ├── for each line:                                                    │
//! │   │     ├── UPDATE products SET quantity -= q WHERE quantity >= q       │
//! │   │     │     └── 0 rows: ProductNotFound | InsufficientStock           │
//! │   │     ├── price_line(tier, product, q, discount)                      │
//! │   │     └── INSERT orders (status = placed)                             │
//! │   │                                                                     │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error before COMMIT drops the transaction: SQLite rolls back the   │
//! │  submission row, the counter and every decrement together.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first statement is a write, so the transaction holds the write lock
//! before it reads anything and never works from a stale snapshot. Competing
//! writers wait on `busy_timeout` and surface as [`DbError::Conflict`] if the
//! lock stays unavailable.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::customer::increment_orders_made;
use crate::repository::order::{find_by_submission, insert_line, NewOrderLine};
use crate::repository::product::decrement_stock;
use stockline_core::pricing::price_line;
use stockline_core::validation::{submission_fingerprint, ValidatedLine};
use stockline_core::{PlacementReceipt, ValidationError};

/// Runs placement transactions.
#[derive(Debug, Clone)]
pub struct PlacementRepository {
    pool: SqlitePool,
}

impl PlacementRepository {
    /// Creates a new PlacementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PlacementRepository { pool }
    }

    /// Places every line of a submission or none of them.
    ///
    /// `lines` must already be shape-validated. Re-sending a committed
    /// `submission_id` with the same customer and lines returns the stored
    /// lines with `replayed = true` and changes nothing.
    ///
    /// ## Errors
    /// * `DbError::Domain(CustomerNotFound | ProductNotFound | InsufficientStock)`
    /// * `DbError::Domain(Validation(Duplicate))` - Key already used for another
    ///   customer, different lines, or a submission whose lines were deleted
    /// * `DbError::Conflict` - Write lock unavailable, retry
    pub async fn place(
        &self,
        submission_id: &str,
        customer_name: &str,
        lines: &[ValidatedLine],
    ) -> DbResult<PlacementReceipt> {
        let customer_name = customer_name.trim();
        debug!(submission_id = %submission_id, customer = %customer_name, lines = lines.len(), "Beginning placement transaction");

        let now = Utc::now();
        let fingerprint = submission_fingerprint(lines);
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            r#"
            INSERT INTO order_submissions (id, customer_name, line_count, lines_fingerprint, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(submission_id)
        .bind(customer_name)
        .bind(lines.len() as i64)
        .bind(&fingerprint)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        if !claimed {
            let (owner, stored): (String, String) = sqlx::query_as(
                "SELECT customer_name, lines_fingerprint FROM order_submissions WHERE id = ?1",
            )
            .bind(submission_id)
            .fetch_one(&mut *tx)
            .await?;

            if owner != customer_name || stored != fingerprint {
                debug!(submission_id = %submission_id, "Key already committed with different content");
                return Err(key_taken(submission_id));
            }

            let orders = find_by_submission(&mut *tx, submission_id).await?;
            tx.rollback().await?;

            // Every stored line was deleted; there is nothing left to replay.
            if orders.is_empty() {
                return Err(key_taken(submission_id));
            }

            info!(submission_id = %submission_id, lines = orders.len(), "Replaying committed submission");
            return Ok(PlacementReceipt::new(submission_id, owner, orders, true));
        }

        let customer = increment_orders_made(&mut *tx, customer_name, lines.len() as i64).await?;

        let mut orders = Vec::with_capacity(lines.len());
        for (idx, line) in lines.iter().enumerate() {
            let product = decrement_stock(&mut *tx, &line.product_name, line.quantity).await?;
            let cost = price_line(idx, customer.tier, &product, line.quantity, line.discount)?;

            let order = insert_line(
                &mut *tx,
                NewOrderLine {
                    id: Uuid::new_v4().to_string(),
                    submission_id,
                    line_no: idx as i64,
                    product_name: &product.name,
                    unit_cost_cents: cost.unit.cents(),
                    quantity: cost.quantity,
                    customer_id: &customer.id,
                    customer_name: &customer.name,
                    gross_cost_cents: cost.gross.cents(),
                    discount_bps: cost.discount.bps(),
                    net_cost_cents: cost.net.cents(),
                    created_at: now,
                },
            )
            .await?;

            debug!(line = idx, product = %product.name, remaining = product.quantity, "Line accepted");
            orders.push(order);
        }

        tx.commit().await?;

        let receipt = PlacementReceipt::new(submission_id, customer.name, orders, false);
        info!(
            submission_id = %submission_id,
            lines = receipt.orders.len(),
            total_net = %receipt.total_net(),
            "Placement committed"
        );
        Ok(receipt)
    }

    /// Returns the lines of a committed submission, if any.
    pub async fn find_submission(&self, submission_id: &str) -> DbResult<Option<PlacementReceipt>> {
        let mut conn = self.pool.acquire().await?;

        let owner: Option<String> =
            sqlx::query_scalar("SELECT customer_name FROM order_submissions WHERE id = ?1")
                .bind(submission_id)
                .fetch_optional(&mut *conn)
                .await?;

        match owner {
            Some(owner) => {
                let orders = find_by_submission(&mut conn, submission_id).await?;
                Ok(Some(PlacementReceipt::new(submission_id, owner, orders, true)))
            }
            None => Ok(None),
        }
    }
}

fn key_taken(submission_id: &str) -> DbError {
    DbError::Domain(
        ValidationError::Duplicate {
            field: "submissionKey".to_string(),
            value: submission_id.to_string(),
        }
        .into(),
    )
}

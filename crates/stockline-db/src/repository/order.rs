//! # Order Repository
//!
//! Read and maintenance access to the order ledger.
//!
//! ## Ledger Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Record Lifecycle                            │
//! │                                                                         │
//! │  1. CREATE (placement transaction only)                                 │
//! │     └── insert_line() → Order { status: Placed }                        │
//! │                                                                         │
//! │  2. STATUS CHANGES (fulfillment)                                        │
//! │     └── update_status_if(id, expected, target)                          │
//! │         compare-and-set: 0 rows means someone else moved it first       │
//! │                                                                         │
//! │  3. (ADMIN) DELETE                                                      │
//! │     └── delete() → stock and counters are left alone                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockline_core::{Order, OrderStatus};

const ORDER_COLUMNS: &str = "id, submission_id, product_name, unit_cost_cents, quantity, \
     customer_id, customer_name, gross_cost_cents, discount_bps, net_cost_cents, status, \
     created_at, updated_at";

/// Row shape of the `orders` table. `status` is stored as text.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OrderRow {
    id: String,
    submission_id: String,
    product_name: String,
    unit_cost_cents: i64,
    quantity: i64,
    customer_id: String,
    customer_name: String,
    gross_cost_cents: i64,
    discount_bps: u32,
    net_cost_cents: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> DbResult<Self> {
        let status: OrderStatus = row.status.parse()?;
        Ok(Order {
            id: row.id,
            submission_id: row.submission_id,
            product_name: row.product_name,
            unit_cost_cents: row.unit_cost_cents,
            quantity: row.quantity,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            gross_cost_cents: row.gross_cost_cents,
            discount_bps: row.discount_bps,
            net_cost_cents: row.net_cost_cents,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Optional filters for [`OrderRepository::list`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub customer_name: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Repository for order ledger operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Lists order records, oldest first, lines of one submission in
    /// submission order.
    pub async fn list(&self, filter: &OrderFilter, limit: i64, offset: i64) -> DbResult<Vec<Order>> {
        debug!(?filter, limit, offset, "Listing orders");

        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE (?1 IS NULL OR customer_name = ?1)
              AND (?2 IS NULL OR status = ?2)
            ORDER BY created_at, submission_id, line_no
            LIMIT ?3 OFFSET ?4
            "#
        ))
        .bind(filter.customer_name.as_deref())
        .bind(filter.status.map(|s| s.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Gets an order record by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Gets every line of a submission, in submission order.
    pub async fn list_by_submission(&self, submission_id: &str) -> DbResult<Vec<Order>> {
        let mut conn = self.pool.acquire().await?;
        find_by_submission(&mut conn, submission_id).await
    }

    /// Moves an order from `expected` to `target` if it is still in
    /// `expected`.
    ///
    /// ## Returns
    /// * `Ok(Some(Order))` - Status changed
    /// * `Ok(None)` - Order missing or no longer in `expected`
    pub async fn update_status_if(
        &self,
        id: &str,
        expected: OrderStatus,
        target: OrderStatus,
    ) -> DbResult<Option<Order>> {
        debug!(id = %id, from = %expected, to = %target, "Updating order status");

        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"
            UPDATE orders
            SET status = ?3, updated_at = ?4
            WHERE id = ?1 AND status = ?2
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected.as_str())
        .bind(target.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Deletes an order record. Stock and customer counters are untouched.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers (shared with the placement transaction)
// =============================================================================

/// A fully priced line ready to be written to the ledger.
#[derive(Debug, Clone)]
pub(crate) struct NewOrderLine<'a> {
    pub id: String,
    pub submission_id: &'a str,
    pub line_no: i64,
    pub product_name: &'a str,
    pub unit_cost_cents: i64,
    pub quantity: i64,
    pub customer_id: &'a str,
    pub customer_name: &'a str,
    pub gross_cost_cents: i64,
    pub discount_bps: u32,
    pub net_cost_cents: i64,
    pub created_at: DateTime<Utc>,
}

pub(crate) async fn insert_line(conn: &mut SqliteConnection, line: NewOrderLine<'_>) -> DbResult<Order> {
    let row: OrderRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO orders (
            id, submission_id, line_no, product_name, unit_cost_cents, quantity,
            customer_id, customer_name, gross_cost_cents, discount_bps, net_cost_cents,
            status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(&line.id)
    .bind(line.submission_id)
    .bind(line.line_no)
    .bind(line.product_name)
    .bind(line.unit_cost_cents)
    .bind(line.quantity)
    .bind(line.customer_id)
    .bind(line.customer_name)
    .bind(line.gross_cost_cents)
    .bind(line.discount_bps)
    .bind(line.net_cost_cents)
    .bind(OrderStatus::Placed.as_str())
    .bind(line.created_at)
    .fetch_one(conn)
    .await?;

    row.try_into()
}

pub(crate) async fn find_by_submission(
    conn: &mut SqliteConnection,
    submission_id: &str,
) -> DbResult<Vec<Order>> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE submission_id = ?1 ORDER BY line_no"
    ))
    .bind(submission_id)
    .fetch_all(conn)
    .await?;

    rows.into_iter().map(Order::try_from).collect()
}

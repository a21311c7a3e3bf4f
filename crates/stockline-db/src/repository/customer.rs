//! # Customer Repository
//!
//! Customer directory: name, address, pricing tier and the orders-made
//! counter. The counter is only ever moved by the placement transaction.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockline_core::{CoreError, Customer, CustomerDraft, CustomerTier};

const CUSTOMER_COLUMNS: &str = "id, name, address, tier, orders_made, created_at, updated_at";

/// Row shape of the `customers` table. `tier` is stored as text.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CustomerRow {
    id: String,
    name: String,
    address: String,
    tier: String,
    orders_made: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = DbError;

    /// Fails with `CoreError::UnknownTier` if the stored tier is not one of
    /// the three known tiers.
    fn try_from(row: CustomerRow) -> DbResult<Self> {
        let tier: CustomerTier = row.tier.parse()?;
        Ok(Customer {
            id: row.id,
            name: row.name,
            address: row.address,
            tier,
            orders_made: row.orders_made,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists customers ordered by name.
    pub async fn list(&self, limit: i64, offset: i64) -> DbResult<Vec<Customer>> {
        debug!(limit, offset, "Listing customers");

        let rows: Vec<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Customer::try_from).collect()
    }

    /// Gets a customer by exact name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE name = ?1"
        ))
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Customer::try_from).transpose()
    }

    /// Inserts a new customer with a zero orders-made counter.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    pub async fn insert(&self, draft: &CustomerDraft) -> DbResult<Customer> {
        let name = draft.name.trim();
        debug!(name = %name, tier = %draft.tier, "Inserting customer");

        let now = Utc::now();
        let row: CustomerRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO customers (id, name, address, tier, orders_made, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(draft.address.trim())
        .bind(draft.tier.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| with_name(e.into(), name))?;

        row.try_into()
    }

    /// Replaces a customer's name, address and tier. The counter is kept.
    pub async fn update(&self, name: &str, draft: &CustomerDraft) -> DbResult<Customer> {
        let current = name.trim();
        let new_name = draft.name.trim();
        debug!(name = %current, new_name = %new_name, "Updating customer");

        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            r#"
            UPDATE customers
            SET name = ?2, address = ?3, tier = ?4, updated_at = ?5
            WHERE name = ?1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(current)
        .bind(new_name)
        .bind(draft.address.trim())
        .bind(draft.tier.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| with_name(e.into(), new_name))?;

        match row {
            Some(row) => row.try_into(),
            None => Err(DbError::not_found("Customer", current)),
        }
    }

    /// Deletes a customer. Orders keep the customer's id and name snapshot.
    pub async fn delete(&self, name: &str) -> DbResult<()> {
        let name = name.trim();
        debug!(name = %name, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE name = ?1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", name));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Adds `lines` to the customer's orders-made counter and returns the
/// updated record.
///
/// Runs as the first write of a placement so the transaction takes the
/// write lock before it reads anything.
///
/// ## Errors
/// * `CoreError::CustomerNotFound` - No such customer
/// * `CoreError::UnknownTier` - Stored tier is not recognised
pub(crate) async fn increment_orders_made(
    conn: &mut SqliteConnection,
    name: &str,
    lines: i64,
) -> DbResult<Customer> {
    let row: Option<CustomerRow> = sqlx::query_as(&format!(
        r#"
        UPDATE customers
        SET orders_made = orders_made + ?2, updated_at = ?3
        WHERE name = ?1
        RETURNING {CUSTOMER_COLUMNS}
        "#
    ))
    .bind(name.trim())
    .bind(lines)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await?;

    match row {
        Some(row) => row.try_into(),
        None => Err(CoreError::CustomerNotFound(name.trim().to_string()).into()),
    }
}

fn with_name(err: DbError, name: &str) -> DbError {
    match err {
        DbError::UniqueViolation { .. } => DbError::duplicate("customer name", name),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn draft(name: &str, tier: CustomerTier) -> CustomerDraft {
        CustomerDraft {
            name: name.to_string(),
            address: "12 Dock Road".to_string(),
            tier,
        }
    }

    #[tokio::test]
    async fn test_insert_get_update_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let created = repo.insert(&draft("Acme Hardware", CustomerTier::Retailer)).await.unwrap();
        assert_eq!(created.orders_made, 0);
        assert!(matches!(
            repo.insert(&draft("Acme Hardware", CustomerTier::Wholesaler)).await,
            Err(DbError::UniqueViolation { .. })
        ));

        let updated = repo
            .update("Acme Hardware", &draft("Acme Hardware Ltd", CustomerTier::Distributor))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.tier, CustomerTier::Distributor);

        assert!(repo.get_by_name("Acme Hardware").await.unwrap().is_none());
        assert_eq!(repo.list(10, 0).await.unwrap().len(), 1);

        repo.delete("Acme Hardware Ltd").await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_increment_orders_made() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.customers().insert(&draft("Acme", CustomerTier::Retailer)).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        increment_orders_made(&mut conn, "Acme", 2).await.unwrap();
        let customer = increment_orders_made(&mut conn, "Acme", 3).await.unwrap();
        assert_eq!(customer.orders_made, 5);

        let err = increment_orders_made(&mut conn, "Nobody", 1).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::CustomerNotFound(n)) if n == "Nobody"));
    }

    #[tokio::test]
    async fn test_unknown_stored_tier_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query(
            "INSERT INTO customers (id, name, address, tier, orders_made, created_at, updated_at)
             VALUES ('c-1', 'Legacy', 'Somewhere', 'platinum', 0, ?1, ?1)",
        )
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let err = db.customers().get_by_name("Legacy").await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::UnknownTier(t)) if t == "platinum"));
    }

    #[tokio::test]
    async fn test_legacy_distributer_spelling_is_read() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query(
            "INSERT INTO customers (id, name, address, tier, orders_made, created_at, updated_at)
             VALUES ('c-2', 'Old Co', 'Somewhere', 'Distributer', 0, ?1, ?1)",
        )
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let customer = db.customers().get_by_name("Old Co").await.unwrap().unwrap();
        assert_eq!(customer.tier, CustomerTier::Distributor);
    }
}

//! # Product Repository
//!
//! Database operations for catalog records.
//!
//! ## Key Operations
//! - CRUD keyed by the normalized product name
//! - Restock (sets quantity and last-restock date)
//! - Conditional stock decrement, used inside the placement transaction
//!
//! ## Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE products                                                        │
//! │     SET quantity = quantity - ?qty                                      │
//! │   WHERE name = ?name AND quantity >= ?qty                               │
//! │  RETURNING *                                                            │
//! │                                                                         │
//! │  1 row  ──► stock taken, row reflects the new quantity                  │
//! │  0 rows ──► product missing OR not enough stock (re-read to tell)       │
//! │                                                                         │
//! │  Check and write are one statement, so two agents racing for the        │
//! │  last units cannot both win.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stockline_core::{CoreError, Product, ProductDraft};

const PRODUCT_COLUMNS: &str = "id, name, category, wholesale_price_cents, retail_price_cents, \
     distributor_price_cents, quantity, last_restocked_at, created_at, updated_at";

/// Row shape of the `products` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: String,
    name: String,
    category: String,
    wholesale_price_cents: i64,
    retail_price_cents: i64,
    distributor_price_cents: i64,
    quantity: i64,
    last_restocked_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            category: row.category,
            wholesale_price_cents: row.wholesale_price_cents,
            retail_price_cents: row.retail_price_cents,
            distributor_price_cents: row.distributor_price_cents,
            quantity: row.quantity,
            last_restocked_at: row.last_restocked_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product database operations.
///
/// Names passed in are normalized (trimmed, lowercased) before lookup, so
/// `"Steel Bolts"` and `"steel bolts "` address the same record.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products ordered by name.
    pub async fn list(&self, limit: i64, offset: i64) -> DbResult<Vec<Product>> {
        debug!(limit, offset, "Listing products");

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name LIMIT ?1 OFFSET ?2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Gets a product by its name.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        find_by_name(&mut conn, name).await
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Inserts a new product from a draft.
    ///
    /// The draft is normalized here; an absent restock date defaults to now.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    pub async fn insert(&self, draft: &ProductDraft) -> DbResult<Product> {
        let draft = draft.normalized();
        debug!(name = %draft.name, "Inserting product");

        let now = Utc::now();
        let row: ProductRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO products (
                id, name, category,
                wholesale_price_cents, retail_price_cents, distributor_price_cents,
                quantity, last_restocked_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(generate_product_id())
        .bind(&draft.name)
        .bind(&draft.category)
        .bind(draft.wholesale_price_cents)
        .bind(draft.retail_price_cents)
        .bind(draft.distributor_price_cents)
        .bind(draft.quantity)
        .bind(draft.last_restocked_at.unwrap_or(now))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| with_name(e.into(), &draft.name))?;

        Ok(row.into())
    }

    /// Replaces a product's fields. The name may change.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No product called `name`
    /// * `Err(DbError::UniqueViolation)` - Renamed onto an existing name
    pub async fn update(&self, name: &str, draft: &ProductDraft) -> DbResult<Product> {
        let current = stockline_core::normalize_product_name(name);
        let draft = draft.normalized();
        debug!(name = %current, new_name = %draft.name, "Updating product");

        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r#"
            UPDATE products SET
                name = ?2,
                category = ?3,
                wholesale_price_cents = ?4,
                retail_price_cents = ?5,
                distributor_price_cents = ?6,
                quantity = ?7,
                last_restocked_at = COALESCE(?8, last_restocked_at),
                updated_at = ?9
            WHERE name = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&current)
        .bind(&draft.name)
        .bind(&draft.category)
        .bind(draft.wholesale_price_cents)
        .bind(draft.retail_price_cents)
        .bind(draft.distributor_price_cents)
        .bind(draft.quantity)
        .bind(draft.last_restocked_at)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| with_name(e.into(), &draft.name))?;

        row.map(Product::from)
            .ok_or_else(|| DbError::not_found("Product", current))
    }

    /// Sets the on-hand quantity after a delivery and stamps the restock date.
    pub async fn restock(&self, name: &str, quantity: i64) -> DbResult<Product> {
        let name = stockline_core::normalize_product_name(name);
        debug!(name = %name, quantity, "Restocking product");

        let now = Utc::now();
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r#"
            UPDATE products
            SET quantity = ?2, last_restocked_at = ?3, updated_at = ?3
            WHERE name = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&name)
        .bind(quantity)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::from)
            .ok_or_else(|| DbError::not_found("Product", name))
    }

    /// Deletes a product. Existing orders keep their snapshot of it.
    pub async fn delete(&self, name: &str) -> DbResult<()> {
        let name = stockline_core::normalize_product_name(name);
        debug!(name = %name, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE name = ?1")
            .bind(&name)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", name));
        }

        Ok(())
    }

    /// Counts products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers (shared with the placement transaction)
// =============================================================================

pub(crate) async fn find_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> DbResult<Option<Product>> {
    let row: Option<ProductRow> = sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE name = ?1"
    ))
    .bind(stockline_core::normalize_product_name(name))
    .fetch_optional(conn)
    .await?;

    Ok(row.map(Product::from))
}

/// Takes `quantity` units of `name` only if that many are on hand.
///
/// ## Errors
/// * `CoreError::ProductNotFound` - No such product
/// * `CoreError::InsufficientStock` - Fewer than `quantity` on hand
pub(crate) async fn decrement_stock(
    conn: &mut SqliteConnection,
    name: &str,
    quantity: i64,
) -> DbResult<Product> {
    let row: Option<ProductRow> = sqlx::query_as(&format!(
        r#"
        UPDATE products
        SET quantity = quantity - ?2, updated_at = ?3
        WHERE name = ?1 AND quantity >= ?2
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(name)
    .bind(quantity)
    .bind(Utc::now())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = row {
        return Ok(row.into());
    }

    // Same transaction, so this read sees exactly why the update missed.
    match find_by_name(conn, name).await? {
        None => Err(CoreError::ProductNotFound(name.to_string()).into()),
        Some(product) => Err(CoreError::InsufficientStock {
            product: product.name,
            available: product.quantity,
            requested: quantity,
        }
        .into()),
    }
}

/// Attaches the offending name to a unique violation.
fn with_name(err: DbError, name: &str) -> DbError {
    match err {
        DbError::UniqueViolation { .. } => DbError::duplicate("product name", name),
        other => other,
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    pub(crate) fn draft(name: &str, quantity: i64) -> ProductDraft {
        ProductDraft {
            name: name.to_string(),
            category: "Fasteners".to_string(),
            wholesale_price_cents: 8000,
            retail_price_cents: 10_000,
            distributor_price_cents: 9000,
            quantity,
            last_restocked_at: None,
        }
    }

    async fn repo() -> ProductRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().products()
    }

    #[tokio::test]
    async fn test_insert_normalizes_and_rejects_duplicates() {
        let repo = repo().await;

        let product = repo.insert(&draft("  Steel Bolts ", 10)).await.unwrap();
        assert_eq!(product.name, "steel bolts");
        assert_eq!(product.category, "fasteners");

        let err = repo.insert(&draft("STEEL BOLTS", 5)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { value, .. } if value == "steel bolts"));

        let found = repo.get_by_name("Steel Bolts").await.unwrap().unwrap();
        assert_eq!(found.id, product.id);
        assert_eq!(repo.get_by_id(&product.id).await.unwrap().unwrap().name, "steel bolts");
    }

    #[tokio::test]
    async fn test_update_restock_and_delete() {
        let repo = repo().await;
        repo.insert(&draft("nuts", 4)).await.unwrap();

        let updated = repo
            .update("nuts", &ProductDraft { retail_price_cents: 12_000, ..draft("Hex Nuts", 4) })
            .await
            .unwrap();
        assert_eq!(updated.name, "hex nuts");
        assert_eq!(updated.retail_price_cents, 12_000);

        let restocked = repo.restock("hex nuts", 40).await.unwrap();
        assert_eq!(restocked.quantity, 40);
        assert!(restocked.last_restocked_at >= updated.last_restocked_at);

        repo.delete("hex nuts").await.unwrap();
        assert!(matches!(repo.delete("hex nuts").await, Err(DbError::NotFound { .. })));
        assert!(matches!(
            repo.update("hex nuts", &draft("x", 1)).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_is_ordered_and_paged() {
        let repo = repo().await;
        for name in ["washers", "anchors", "bolts"] {
            repo.insert(&draft(name, 1)).await.unwrap();
        }

        let names: Vec<_> = repo.list(2, 0).await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["anchors", "bolts"]);
        assert_eq!(repo.list(10, 2).await.unwrap().len(), 1);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_decrement_is_conditional() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products().insert(&draft("bolts", 5)).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();

        let product = decrement_stock(&mut conn, "bolts", 3).await.unwrap();
        assert_eq!(product.quantity, 2);

        let err = decrement_stock(&mut conn, "bolts", 3).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 2, requested: 3, .. })
        ));

        let err = decrement_stock(&mut conn, "rivets", 1).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));
    }
}

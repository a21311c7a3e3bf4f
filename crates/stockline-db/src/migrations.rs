//! # Schema Migrations
//!
//! The order store's schema ships inside the binary and is brought up to
//! date before the pool is handed to any repository.
//!
//! ## Startup and Health
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database::new ──► run_migrations ──► repositories usable               │
//! │                                                                         │
//! │  GET /health ──► migration_status                                       │
//! │                   ├── applied == embedded  → current                    │
//! │                   └── applied <  embedded  → 503, schema behind binary  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Schema files live in `migrations/sqlite/` as `NNN_description.sql`.
//! Applied files are checksummed, so changes go in a new file.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::DbResult;

/// Schema files embedded at compile time.
///
/// ```text
/// migrations/sqlite/
/// └── 001_initial_schema.sql  # products, customers, order_submissions, orders
/// ```
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// How far the connected store's schema is from the embedded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    /// Migrations embedded in this binary.
    pub total: usize,
    /// Migrations recorded as successfully applied.
    pub applied: usize,
}

impl MigrationStatus {
    /// Whether every embedded migration has been applied.
    pub fn is_current(&self) -> bool {
        self.applied >= self.total
    }
}

/// Applies pending migrations in filename order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(embedded = MIGRATOR.migrations.len(), "Applying pending schema migrations");
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Counts embedded migrations against the ones the store has applied.
///
/// A store that was opened without running migrations has no
/// `_sqlx_migrations` table yet and reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let total = MIGRATOR.migrations.len();

    let tracked: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations')",
    )
    .fetch_one(pool)
    .await?;

    let applied: i64 = if tracked {
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?
    } else {
        0
    };

    let status = MigrationStatus {
        total,
        applied: applied as usize,
    };
    if !status.is_current() {
        warn!(total, applied = status.applied, "Schema is behind the embedded migrations");
    }
    Ok(status)
}

//! # stockline-db: Database Layer for Stockline
//!
//! SQLite storage for the catalog, the customer directory and the order
//! ledger, plus the transaction that places a submission.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockline Data Flow                              │
//! │                                                                         │
//! │  Placement Engine (order-service)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockline-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │   │   │
//! │  │   │               │    │ ProductRepo    │    │              │   │   │
//! │  │   │ SqlitePool    │◄───│ CustomerRepo   │    │ 001_init.sql │   │   │
//! │  │   │ WAL, busy     │    │ OrderRepo      │    │              │   │   │
//! │  │   │ timeout       │    │ PlacementRepo  │    │              │   │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockline_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/stockline.db")).await?;
//!
//! let lines = stockline_core::validation::validate_lines(&request.lines)?;
//! let receipt = db.placement().place("sub-1", "Acme Hardware", &lines).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::order::{OrderFilter, OrderRepository};
pub use repository::placement::PlacementRepository;
pub use repository::product::ProductRepository;

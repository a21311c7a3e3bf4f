//! # Repository Module
//!
//! Database repository implementations for Stockline.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().get_by_name("steel bolts")                      │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list(&self, limit, offset)                                        │
//! │  ├── get_by_name(&self, name)                                          │
//! │  ├── insert(&self, draft)                                              │
//! │  └── update(&self, name, draft)                                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (mock the repository)                                  │
//! │  • SQL is isolated in one place                                        │
//! │  • Connection-level helpers let the placement transaction reuse the    │
//! │    same statements on its own connection                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD and restock
//! - [`customer::CustomerRepository`] - Customer directory
//! - [`order::OrderRepository`] - Order ledger reads, status CAS, delete
//! - [`placement::PlacementRepository`] - The placement transaction

pub mod customer;
pub mod order;
pub mod placement;
pub mod product;

//! # Stockline Order Service
//!
//! The boundary around the order placement engine: authentication, role
//! checks, JSON over HTTP.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP request                                                           │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  auth_middleware ── bearer JWT ──► Principal { user_id, role }          │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  handler ── principal.require(Operation) ── 403 on wrong role           │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  engine (PlacementEngine / FulfillmentService)                          │
//! │     │    validation, retry on conflict, store timeout                   │
//! │     ▼                                                                   │
//! │  stockline-db repositories ──► SQLite                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::{JwtManager, Operation, Principal, Role};
pub use config::ServiceConfig;
pub use engine::{EngineError, EngineSettings, FulfillmentService, PlacementEngine};
pub use error::{ApiError, ErrorCode};
pub use routes::build_router;
pub use state::AppState;

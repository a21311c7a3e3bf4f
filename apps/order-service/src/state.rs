//! Shared application state handed to every handler.

use std::sync::Arc;

use stockline_db::Database;

use crate::auth::JwtManager;
use crate::engine::{EngineSettings, FulfillmentService, PlacementEngine};

/// Cheap to clone: the pool and repositories are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub placement: PlacementEngine,
    pub fulfillment: FulfillmentService,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, settings: EngineSettings, jwt: JwtManager) -> Self {
        AppState {
            placement: PlacementEngine::new(db.placement(), settings),
            fulfillment: FulfillmentService::new(db.orders(), settings),
            db,
            jwt: Arc::new(jwt),
        }
    }
}

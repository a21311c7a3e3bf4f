//! HTTP surface.
//!
//! ```text
//! /health                         public
//! /orders, /submissions           bearer token, role checked per handler
//! /products, /customers           bearer token, role checked per handler
//! ```

use axum::routing::get;
use axum::Router;

use crate::auth::auth_middleware;
use crate::state::AppState;

pub mod customers;
pub mod health;
pub mod orders;
pub mod products;

/// Query parameters shared by the list endpoints.
#[derive(Debug, Default, serde::Deserialize)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Page {
    /// Limit and offset clamped to the accepted ranges.
    pub fn resolve(&self) -> (i64, i64) {
        (
            self.limit
                .unwrap_or(stockline_core::DEFAULT_PAGE_LIMIT)
                .clamp(1, stockline_core::MAX_PAGE_LIMIT),
            self.offset.unwrap_or(0).max(0),
        )
    }
}

/// Builds the full HTTP router.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/orders", orders::router())
        .route("/submissions/:key", get(orders::get_submission))
        .nest("/products", products::router())
        .nest("/customers", customers::router())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(protected)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_resolve_clamps() {
        assert_eq!(Page::default().resolve(), (50, 0));

        let page = Page { limit: Some(10_000), offset: Some(-3) };
        assert_eq!(page.resolve(), (500, 0));

        let page = Page { limit: Some(0), offset: Some(20) };
        assert_eq!(page.resolve(), (1, 20));
    }
}

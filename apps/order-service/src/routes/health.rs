use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

/// Database round trip plus schema currency. Unauthenticated.
///
/// Reports 503 when the store is unreachable or its schema is behind the
/// migrations embedded in this build.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.db.health_check().await;
    let migrations = match state.db.migration_status().await {
        Ok(status) => Some(status),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read migration status");
            None
        }
    };

    let healthy = database && migrations.is_some_and(|m| m.is_current());
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "degraded" },
            "database": database,
            "migrations": migrations,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

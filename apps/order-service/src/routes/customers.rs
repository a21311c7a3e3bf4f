//! Customer directory.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};

use stockline_core::validation::validate_customer_draft;
use stockline_core::{Customer, CustomerDraft};

use super::Page;
use crate::auth::{Operation, Principal};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_customer).get(list_customers))
        .route("/:name", get(get_customer).put(update_customer).delete(delete_customer))
}

pub async fn list_customers(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    principal.require(Operation::ReadCustomers)?;
    let (limit, offset) = page.resolve();
    Ok(Json(state.db.customers().list(limit, offset).await?))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    principal.require(Operation::ReadCustomers)?;
    state
        .db
        .customers()
        .get_by_name(&name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Customer", &name))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(draft): Json<CustomerDraft>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    principal.require(Operation::WriteCustomers)?;
    validate_customer_draft(&draft)?;

    let customer = state.db.customers().insert(&draft).await?;
    tracing::info!(name = %customer.name, tier = %customer.tier, "Customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
    Json(draft): Json<CustomerDraft>,
) -> Result<Json<Customer>, ApiError> {
    principal.require(Operation::WriteCustomers)?;
    validate_customer_draft(&draft)?;

    Ok(Json(state.db.customers().update(&name, &draft).await?))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    principal.require(Operation::WriteCustomers)?;
    state.db.customers().delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

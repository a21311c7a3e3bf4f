//! Catalog management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use stockline_core::validation::{validate_product_draft, validate_stock_quantity};
use stockline_core::{Product, ProductDraft};

use super::Page;
use crate::auth::{Operation, Principal};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:name", get(get_product).put(update_product).delete(delete_product))
        .route("/:name/restock", post(restock_product))
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i64,
}

pub async fn list_products(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<Product>>, ApiError> {
    principal.require(Operation::ReadCatalog)?;
    let (limit, offset) = page.resolve();
    Ok(Json(state.db.products().list(limit, offset).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
) -> Result<Json<Product>, ApiError> {
    principal.require(Operation::ReadCatalog)?;
    state
        .db
        .products()
        .get_by_name(&name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &name))
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    principal.require(Operation::WriteCatalog)?;
    let draft = draft.normalized();
    validate_product_draft(&draft)?;

    let product = state.db.products().insert(&draft).await?;
    tracing::info!(name = %product.name, user = %principal.user_id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Product>, ApiError> {
    principal.require(Operation::WriteCatalog)?;
    let draft = draft.normalized();
    validate_product_draft(&draft)?;

    Ok(Json(state.db.products().update(&name, &draft).await?))
}

pub async fn restock_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
    Json(body): Json<RestockRequest>,
) -> Result<Json<Product>, ApiError> {
    principal.require(Operation::WriteCatalog)?;
    validate_stock_quantity(body.quantity)?;

    Ok(Json(state.db.products().restock(&name, body.quantity).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    principal.require(Operation::WriteCatalog)?;
    state.db.products().delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Order placement, fulfillment and ledger reads.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use stockline_core::{Order, OrderStatus, PlaceOrderRequest, PlacementReceipt, StatusUpdateRequest};
use stockline_db::OrderFilter;

use crate::auth::{Operation, Principal};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(place_order).get(list_orders))
        .route("/:id", get(get_order).delete(delete_order))
        .route("/:id/status", patch(update_status))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub customer_name: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `201 Created` for a new submission, `200 OK` when a committed key is
/// replayed.
pub async fn place_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlacementReceipt>), ApiError> {
    principal.require(Operation::PlaceOrder)?;

    let receipt = state.placement.place_order(body).await?;
    let status = if receipt.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((status, Json(receipt)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    principal.require(Operation::ReadOrders)?;

    let status = query
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()?;
    let filter = OrderFilter {
        customer_name: query.customer_name.map(|name| name.trim().to_string()),
        status,
    };

    let orders = state
        .fulfillment
        .list_orders(&filter, query.limit, query.offset)
        .await?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    principal.require(Operation::ReadOrders)?;
    Ok(Json(state.fulfillment.get_order(&id).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<Order>, ApiError> {
    principal.require(Operation::UpdateOrderStatus)?;
    Ok(Json(state.fulfillment.update_status(&id, &body.status).await?))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    principal.require(Operation::DeleteOrder)?;
    state.fulfillment.delete_order(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_submission(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(key): Path<String>,
) -> Result<Json<PlacementReceipt>, ApiError> {
    principal.require(Operation::ReadOrders)?;
    Ok(Json(state.placement.find_submission(&key).await?))
}

//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::models::{
    AddItemInput, CheckoutInput, ClosedOrderProjection, Order, ServeInput, VoidItemInput,
    VoidOrderInput,
};

use crate::api::{ApiResponse, Operator, run_ledger};
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Default, Deserialize)]
pub struct PlaceRequest {
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// GET /api/orders - 未结订单
pub async fn list_open(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<Order>>> {
    let orders = run_ledger(&state, |s| s.orders.list_open_orders()).await?;
    Ok(ApiResponse::success(orders))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = run_ledger(&state, move |s| s.orders.get_order(&id)).await?;
    Ok(ApiResponse::success(order))
}

/// POST /api/orders/{id}/items
pub async fn add_item(
    State(state): State<ServerState>,
    Operator(session): Operator,
    Path(id): Path<String>,
    Json(input): Json<AddItemInput>,
) -> AppResult<ApiResponse<Order>> {
    let order = run_ledger(&state, move |s| s.orders.add_item(&id, input, &session)).await?;
    Ok(ApiResponse::success(order))
}

/// POST /api/orders/{id}/items/void
pub async fn void_item(
    State(state): State<ServerState>,
    Operator(session): Operator,
    Path(id): Path<String>,
    Json(input): Json<VoidItemInput>,
) -> AppResult<ApiResponse<Order>> {
    let order = run_ledger(&state, move |s| s.orders.void_item(&id, input, &session)).await?;
    Ok(ApiResponse::success(order))
}

/// POST /api/orders/{id}/place
pub async fn place(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<PlaceRequest>>,
) -> AppResult<ApiResponse<Order>> {
    let expected_version = payload.and_then(|Json(p)| p.expected_version);
    let order = run_ledger(&state, move |s| s.orders.place_order(&id, expected_version)).await?;
    Ok(ApiResponse::success(order))
}

/// POST /api/orders/{id}/serve
pub async fn serve(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<ServeInput>>,
) -> AppResult<ApiResponse<Order>> {
    let input = payload.map(|Json(p)| p).unwrap_or_default();
    let order = run_ledger(&state, move |s| s.orders.mark_served(&id, input)).await?;
    Ok(ApiResponse::success(order))
}

/// POST /api/orders/{id}/void - 整单作废，全部回库存
pub async fn void_order(
    State(state): State<ServerState>,
    Operator(session): Operator,
    Path(id): Path<String>,
    payload: Option<Json<VoidOrderInput>>,
) -> AppResult<ApiResponse<Order>> {
    let input = payload.map(|Json(p)| p).unwrap_or_default();
    let order = run_ledger(&state, move |s| s.orders.void_order(&id, input, &session)).await?;
    Ok(ApiResponse::success(order))
}

/// POST /api/orders/{id}/checkout - 现金结账
pub async fn checkout(
    State(state): State<ServerState>,
    Operator(session): Operator,
    Path(id): Path<String>,
    Json(input): Json<CheckoutInput>,
) -> AppResult<ApiResponse<ClosedOrderProjection>> {
    let receipt = run_ledger(&state, move |s| {
        s.checkout.checkout(&id, input.tendered, &session)
    })
    .await?;
    Ok(ApiResponse::success(receipt))
}

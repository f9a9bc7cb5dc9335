//! 桌台 API - 开单与预留
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/tables/{table}/order | GET | 当前未结订单 (无则 data 为 null) |
//! | /api/tables/{table}/order | POST | 开新单 (已有未结订单则 409) |
//! | /api/tables/{table}/order/ensure | POST | 取当前单，没有就开一张 |
//! | /api/tables/{table}/reservation | POST | 切换预留状态 |

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use shared::models::Order;

use crate::api::{ApiResponse, Operator, run_ledger};
use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", table_routes())
}

fn table_routes() -> Router<ServerState> {
    Router::new()
        .route("/{table}/order", get(open_order).post(create_order))
        .route("/{table}/order/ensure", post(ensure_order))
        .route("/{table}/reservation", post(toggle_reservation))
}

async fn open_order(
    State(state): State<ServerState>,
    Path(table): Path<String>,
) -> AppResult<ApiResponse<Option<Order>>> {
    let order = run_ledger(&state, move |s| s.orders.try_get_open_order(&table)).await?;
    Ok(ApiResponse::success(order))
}

async fn create_order(
    State(state): State<ServerState>,
    Operator(session): Operator,
    Path(table): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = run_ledger(&state, move |s| s.orders.create_open_order(&table, &session)).await?;
    Ok(ApiResponse::success(order))
}

async fn ensure_order(
    State(state): State<ServerState>,
    Operator(session): Operator,
    Path(table): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = run_ledger(&state, move |s| {
        s.orders.get_or_create_open_order(&table, &session)
    })
    .await?;
    Ok(ApiResponse::success(order))
}

async fn toggle_reservation(
    State(state): State<ServerState>,
    Operator(session): Operator,
    Path(table): Path<String>,
) -> AppResult<ApiResponse<Order>> {
    let order = run_ledger(&state, move |s| s.orders.toggle_reservation(&table, &session)).await?;
    Ok(ApiResponse::success(order))
}

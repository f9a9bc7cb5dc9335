//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::models::{LedgerEntry, Product, ProductCreate, ProductUpdate, StockAdjustment, StockAudit};

use crate::api::{ApiResponse, Operator, run_ledger};
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub note: Option<String>,
}

/// New stock level after an adjustment
#[derive(Debug, Serialize)]
pub struct StockLevel {
    pub product_id: String,
    pub current_stock: i64,
}

/// GET /api/products - 所有商品 (按名称排序，不分大小写)
pub async fn list(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<Product>>> {
    let products = run_ledger(&state, |s| s.inventory.list_products()).await?;
    Ok(ApiResponse::success(products))
}

/// GET /api/products/low-stock - 低于阈值的商品
pub async fn list_low_stock(
    State(state): State<ServerState>,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let products = run_ledger(&state, |s| s.inventory.list_low_stock()).await?;
    Ok(ApiResponse::success(products))
}

/// GET /api/products/categories - 可用分类
pub async fn list_categories(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<String>>> {
    Ok(ApiResponse::success(state.catalog.categories()))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Product>> {
    let product = run_ledger(&state, move |s| s.inventory.get_product(&id)).await?;
    Ok(ApiResponse::success(product))
}

/// POST /api/products - 新建商品 (记 INITIAL_SETUP)
pub async fn create(
    State(state): State<ServerState>,
    Operator(session): Operator,
    Json(payload): Json<ProductCreate>,
) -> AppResult<ApiResponse<Product>> {
    let product = run_ledger(&state, move |s| s.inventory.create_product(payload, &session)).await?;
    Ok(ApiResponse::success(product))
}

/// PUT /api/products/{id} - 修改商品 (记 UPDATE)
pub async fn update(
    State(state): State<ServerState>,
    Operator(session): Operator,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<ApiResponse<Product>> {
    let product = run_ledger(&state, move |s| {
        s.inventory.update_product(&id, payload, &session)
    })
    .await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /api/products/{id} - 删除商品 (记 VOID_DELETE，流水保留)
pub async fn delete(
    State(state): State<ServerState>,
    Operator(session): Operator,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> AppResult<ApiResponse<bool>> {
    run_ledger(&state, move |s| s.inventory.remove_product(&id, &session, query.note)).await?;
    Ok(ApiResponse::success(true))
}

/// POST /api/products/{id}/stock - 手动库存调整
pub async fn adjust_stock(
    State(state): State<ServerState>,
    Operator(session): Operator,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjustment>,
) -> AppResult<ApiResponse<StockLevel>> {
    let level = run_ledger(&state, move |s| {
        let current_stock =
            s.inventory
                .adjust_stock(&id, payload.delta, payload.kind, &session, payload.note)?;
        Ok(StockLevel {
            product_id: id,
            current_stock,
        })
    })
    .await?;
    Ok(ApiResponse::success(level))
}

/// POST /api/products/{id}/restock - 进货
pub async fn restock(
    State(state): State<ServerState>,
    Operator(session): Operator,
    Path(id): Path<String>,
    Json(payload): Json<RestockRequest>,
) -> AppResult<ApiResponse<StockLevel>> {
    let level = run_ledger(&state, move |s| {
        let current_stock = s
            .inventory
            .restock(&id, payload.quantity, &session, payload.note)?;
        Ok(StockLevel {
            product_id: id,
            current_stock,
        })
    })
    .await?;
    Ok(ApiResponse::success(level))
}

/// GET /api/products/{id}/ledger - 商品流水 (新的在前)
pub async fn list_entries(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<LedgerEntry>>> {
    let entries = run_ledger(&state, move |s| s.inventory.list_entries(Some(&id))).await?;
    Ok(ApiResponse::success(entries))
}

/// GET /api/products/{id}/audit - 流水重放校验
pub async fn audit(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<StockAudit>> {
    let audit = run_ledger(&state, move |s| s.inventory.audit_product(&id)).await?;
    Ok(ApiResponse::success(audit))
}

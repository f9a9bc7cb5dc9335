//! 库存流水 API
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/inventory/ledger | GET | 全部流水 (新的在前，可按 product_id 过滤) |

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use shared::models::LedgerEntry;

use crate::api::{ApiResponse, run_ledger};
use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/inventory/ledger", get(list_entries))
}

#[derive(Debug, Default, Deserialize)]
pub struct LedgerQuery {
    #[serde(default)]
    pub product_id: Option<String>,
    /// Return at most this many entries
    #[serde(default)]
    pub limit: Option<usize>,
}

async fn list_entries(
    State(state): State<ServerState>,
    Query(query): Query<LedgerQuery>,
) -> AppResult<ApiResponse<Vec<LedgerEntry>>> {
    let LedgerQuery { product_id, limit } = query;
    let mut entries =
        run_ledger(&state, move |s| s.inventory.list_entries(product_id.as_deref())).await?;
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    Ok(ApiResponse::success(entries))
}

//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 健康检查 (含账本序号) |

use axum::{Router, extract::State, routing::get};
use serde::Serialize;

use crate::api::{ApiResponse, run_ledger};
use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// 最新库存流水序号
    ledger_sequence: u64,
    open_tables: usize,
}

async fn health(State(state): State<ServerState>) -> AppResult<ApiResponse<HealthResponse>> {
    let ledger_sequence =
        run_ledger(&state, |s| Ok(s.storage.current_ledger_sequence()?)).await?;

    Ok(ApiResponse::success(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        ledger_sequence,
        open_tables: state.floor.get_floor_status().len(),
    }))
}

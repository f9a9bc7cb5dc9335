//! 当班销售 API
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/sales/session | GET | 当前操作员本班次已结订单汇总 |
//!
//! 默认取请求头里的操作员和登录时间，`username` / `since` 查询参数可覆盖。

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use shared::models::SessionSales;

use crate::api::{ApiResponse, Operator, run_ledger};
use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/sales/session", get(session_sales))
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionSalesQuery {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub since: Option<i64>,
}

async fn session_sales(
    State(state): State<ServerState>,
    Operator(session): Operator,
    Query(query): Query<SessionSalesQuery>,
) -> AppResult<ApiResponse<SessionSales>> {
    let username = query.username.unwrap_or(session.username);
    let since = query.since.unwrap_or(session.session_started_at);
    let sales = run_ledger(&state, move |s| s.sales.get_session_sales(&username, since)).await?;
    Ok(ApiResponse::success(sales))
}

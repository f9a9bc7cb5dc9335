//! API 路由模块
//!
//! - [`health`] - 健康检查
//! - [`products`] - 商品与库存调整
//! - [`inventory`] - 库存流水
//! - [`tables`] - 桌台开单 / 预留
//! - [`orders`] - 订单明细、作废与结账
//! - [`floor`] - 楼面状态 (含 SSE 推送)
//! - [`sales`] - 当班销售额
//!
//! 所有响应都包在 [`ApiResponse`] 里。账本操作是阻塞的 redb 事务，
//! 通过 [`run_ledger`] 放进 blocking 线程池并加上超时。

pub mod extractor;

pub mod floor;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod sales;
pub mod tables;

pub use extractor::Operator;

use crate::core::ServerState;
use crate::utils::{AppError, AppResult, LedgerError, LedgerResult};
pub use shared::ApiResponse;

/// Run a blocking ledger call off the async runtime, bounded by the request timeout
///
/// A timeout surfaces as an Internal error. The transaction itself is not
/// cancelled: it either commits or aborts on its own.
pub async fn run_ledger<T, F>(state: &ServerState, call: F) -> AppResult<T>
where
    F: FnOnce(&ServerState) -> LedgerResult<T> + Send + 'static,
    T: Send + 'static,
{
    let timeout = state.config.request_timeout();
    let worker_state = state.clone();
    let handle = tokio::task::spawn_blocking(move || call(&worker_state));

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result.map_err(AppError::from),
        Ok(Err(join_err)) => {
            tracing::error!(error = %join_err, "Ledger task failed");
            Err(LedgerError::Internal("Ledger task failed".into()).into())
        }
        Err(_) => {
            let ms = state.config.request_timeout_ms;
            tracing::warn!(timeout_ms = ms, "Ledger call timed out");
            Err(LedgerError::Timeout(ms).into())
        }
    }
}

//! Product API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/products | GET / POST | 列表 / 新建 |
//! | /api/products/low-stock | GET | 低库存商品 |
//! | /api/products/categories | GET | 可用分类 |
//! | /api/products/{id} | GET / PUT / DELETE | 查询 / 修改 / 删除 |
//! | /api/products/{id}/stock | POST | 库存调整 |
//! | /api/products/{id}/restock | POST | 进货 |
//! | /api/products/{id}/ledger | GET | 该商品的库存流水 |
//! | /api/products/{id}/audit | GET | 流水重放校验 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", product_routes())
}

fn product_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/low-stock", get(handler::list_low_stock))
        .route("/categories", get(handler::list_categories))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/stock", post(handler::adjust_stock))
        .route("/{id}/restock", post(handler::restock))
        .route("/{id}/ledger", get(handler::list_entries))
        .route("/{id}/audit", get(handler::audit))
}

//! Order API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | GET | 所有未结订单 |
//! | /api/orders/{id} | GET | 订单详情 |
//! | /api/orders/{id}/items | POST | 加菜 (扣库存) |
//! | /api/orders/{id}/items/void | POST | 退菜 (回库存) |
//! | /api/orders/{id}/place | POST | 下单到吧台 |
//! | /api/orders/{id}/serve | POST | 标记已上 |
//! | /api/orders/{id}/void | POST | 整单作废 |
//! | /api/orders/{id}/checkout | POST | 现金结账 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_open))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/items", post(handler::add_item))
        .route("/{id}/items/void", post(handler::void_item))
        .route("/{id}/place", post(handler::place))
        .route("/{id}/serve", post(handler::serve))
        .route("/{id}/void", post(handler::void_order))
        .route("/{id}/checkout", post(handler::checkout))
}

//! HTTP 应用组装
//!
//! 合并所有 API 路由并挂上通用中间件 (CORS、压缩、访问日志)。

use crate::core::ServerState;
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = std::time::Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        "{} {} {} {}ms",
        method,
        uri,
        response.status(),
        started.elapsed().as_millis()
    );

    response
}

/// All routes, still needing state
pub fn routes() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::products::router())
        .merge(crate::api::inventory::router())
        .merge(crate::api::tables::router())
        .merge(crate::api::orders::router())
        .merge(crate::api::floor::router())
        .merge(crate::api::sales::router())
}

/// Ready-to-serve application
pub fn build_app(state: ServerState) -> Router {
    routes()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
}

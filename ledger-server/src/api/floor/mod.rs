//! 楼面状态 API
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/floor | GET | 所有占用中的桌台 |
//! | /api/floor/events | GET | 桌台变更推送 (Server-Sent Events) |
//!
//! 读的是内存投影，不碰数据库。

use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::Stream;
use shared::models::TableStatus;
use tokio::sync::broadcast::error::RecvError;

use crate::api::ApiResponse;
use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/floor", get(floor_status))
        .route("/api/floor/events", get(floor_events))
}

async fn floor_status(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<TableStatus>>> {
    Ok(ApiResponse::success(state.floor.get_floor_status()))
}

/// Each event is a JSON [`FloorEvent`](shared::models::FloorEvent) named `floor`.
/// A slow client that falls behind receives a `lagged` event and should
/// refetch `/api/floor`.
async fn floor_events(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.floor.subscribe();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(floor_event) => match Event::default().event("floor").json_data(&floor_event) {
                    Ok(event) => return Some((Ok(event), rx)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to encode floor event");
                        continue;
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    let event = Event::default().event("lagged").data(skipped.to_string());
                    return Some((Ok(event), rx));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

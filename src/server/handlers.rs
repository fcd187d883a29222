use axum::{Json, Router, extract::Extension, http::StatusCode, routing::get};
use std::sync::Arc;

use super::protocol::{CounterResponse, ENDPOINT_COUNTER, ENDPOINT_STATS, StatsResponse};
use super::service::CounterServer;

/// Routes for the stats surface. Mount with `axum::serve`.
pub fn router(server: Arc<CounterServer>) -> Router {
    Router::new()
        .route(ENDPOINT_STATS, get(handle_stats))
        .route(ENDPOINT_COUNTER, get(handle_counter))
        .layer(Extension(server))
}

pub async fn handle_stats(
    Extension(server): Extension<Arc<CounterServer>>,
) -> (StatusCode, Json<StatsResponse>) {
    (StatusCode::OK, Json(server.stats()))
}

pub async fn handle_counter(
    Extension(server): Extension<Arc<CounterServer>>,
) -> (StatusCode, Json<CounterResponse>) {
    (
        StatusCode::OK,
        Json(CounterResponse {
            counter: server.store().read(),
        }),
    )
}

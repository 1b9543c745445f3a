use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use posbridge_core::errors::ValidationError;
use posbridge_core::orders::{NewOrderQueueEntry, OrderQueueEntry, QueueEntryStatus};

const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 500;

/// Intake for the order-placement collaborator. The entry is validated and
/// parked as `pending`; the worker picks it up on the next tick.
async fn enqueue_order(
    State(state): State<Arc<AppState>>,
    Json(new_entry): Json<NewOrderQueueEntry>,
) -> ApiResult<Json<OrderQueueEntry>> {
    let entry = state.order_sync_service.enqueue_order(new_entry).await?;
    Ok(Json(entry))
}

#[derive(serde::Deserialize)]
struct QueueQuery {
    status: Option<String>,
    limit: Option<i64>,
}

async fn list_queue_entries(
    Query(query): Query<QueueQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<OrderQueueEntry>>> {
    let status_filter = query
        .status
        .map(|raw| raw.parse::<QueueEntryStatus>())
        .transpose()
        .map_err(|e| posbridge_core::Error::from(ValidationError::InvalidInput(e)))?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let entries = state.queue.list(status_filter, limit)?;
    Ok(Json(entries))
}

async fn get_queue_entry(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<OrderQueueEntry>> {
    let entry = state.queue.get_by_id(&id)?;
    Ok(Json(entry))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/queue/orders", get(list_queue_entries).post(enqueue_order))
        .route("/queue/orders/{id}", get(get_queue_entry))
}

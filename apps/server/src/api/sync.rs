use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use posbridge_core::errors::ValidationError;
use posbridge_core::menu::{MenuSyncRecord, MenuSyncStatus, MenuSyncSummary};
use posbridge_core::orders::{OrderSyncRecord, OrderSyncRunSummary, QueueEntryStatus};
use serde::Serialize;

use crate::scheduler::SchedulerStatus;

const DEFAULT_RECORD_LIMIT: i64 = 50;
const MAX_RECORD_LIMIT: i64 = 500;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderRecordQuery {
    order_id: Option<String>,
    order_number: Option<String>,
    limit: Option<i64>,
}

/// Order sync history. With `orderId` or `orderNumber` the lookup is exact;
/// otherwise the most recent records are returned.
async fn list_order_records(
    Query(query): Query<OrderRecordQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<OrderSyncRecord>>> {
    if let Some(order_id) = query.order_id.as_deref() {
        let record = state.order_sync_records.get_by_order_id(order_id)?;
        return Ok(Json(record.into_iter().collect()));
    }
    if let Some(order_number) = query.order_number.as_deref() {
        let record = state
            .order_sync_records
            .find_success_by_order_number(order_number)?;
        return Ok(Json(record.into_iter().collect()));
    }
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECORD_LIMIT)
        .clamp(1, MAX_RECORD_LIMIT);
    let records = state.order_sync_records.list_recent(limit)?;
    Ok(Json(records))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct MenuRecordQuery {
    config_id: Option<String>,
    status: Option<String>,
}

/// Menu sync state for one configuration. `status=quarantined` is the
/// operator's review list of products awaiting a category mapping.
async fn list_menu_records(
    Query(query): Query<MenuRecordQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<MenuSyncRecord>>> {
    let config_id = query.config_id.ok_or_else(|| {
        posbridge_core::Error::from(ValidationError::MissingField("configId".to_string()))
    })?;
    let status_filter = query
        .status
        .map(|raw| raw.parse::<MenuSyncStatus>())
        .transpose()
        .map_err(|e| posbridge_core::Error::from(ValidationError::InvalidInput(e)))?;
    let records = state
        .menu_sync_records
        .list_for_config(&config_id, status_filter)?;
    Ok(Json(records))
}

async fn trigger_order_sync(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<OrderSyncRunSummary>> {
    match state.scheduler.run_order_tick().await {
        None => Err(ApiError::Conflict("Order sync is already running".to_string())),
        Some(result) => Ok(Json(result?)),
    }
}

async fn trigger_menu_sync(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<MenuSyncSummary>> {
    match state.scheduler.run_menu_tick().await {
        None => Err(ApiError::Conflict("Menu sync is already running".to_string())),
        Some(result) => Ok(Json(result?)),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueueCounts {
    pending: i64,
    processing: i64,
    completed: i64,
    failed: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncStatusResponse {
    scheduler: SchedulerStatus,
    queue: QueueCounts,
}

async fn get_sync_status(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SyncStatusResponse>> {
    let queue = QueueCounts {
        pending: state.queue.count_by_status(QueueEntryStatus::Pending)?,
        processing: state.queue.count_by_status(QueueEntryStatus::Processing)?,
        completed: state.queue.count_by_status(QueueEntryStatus::Completed)?,
        failed: state.queue.count_by_status(QueueEntryStatus::Failed)?,
    };
    Ok(Json(SyncStatusResponse {
        scheduler: state.scheduler.status(),
        queue,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync/orders/records", get(list_order_records))
        .route("/sync/menu/records", get(list_menu_records))
        .route("/sync/orders/trigger", post(trigger_order_sync))
        .route("/sync/menu/trigger", post(trigger_menu_sync))
        .route("/sync/status", get(get_sync_status))
}

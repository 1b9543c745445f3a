use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use posbridge_core::mappings::{CategoryMapping, CategoryMappingUpdate, NewCategoryMapping};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct MappingQuery {
    store_id: Option<String>,
}

async fn list_mappings(
    Query(query): Query<MappingQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CategoryMapping>>> {
    let mappings = state
        .mapping_service
        .list_mappings(query.store_id.as_deref())?;
    Ok(Json(mappings))
}

async fn create_mapping(
    State(state): State<Arc<AppState>>,
    Json(new_mapping): Json<NewCategoryMapping>,
) -> ApiResult<Json<CategoryMapping>> {
    let mapping = state.mapping_service.create_mapping(new_mapping).await?;
    Ok(Json(mapping))
}

async fn update_mapping(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<CategoryMappingUpdate>,
) -> ApiResult<Json<CategoryMapping>> {
    let mapping = state.mapping_service.update_mapping(&id, update).await?;
    Ok(Json(mapping))
}

async fn delete_mapping(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.mapping_service.delete_mapping(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/category-mappings",
            get(list_mappings).post(create_mapping),
        )
        .route(
            "/category-mappings/{id}",
            put(update_mapping).delete(delete_mapping),
        )
}

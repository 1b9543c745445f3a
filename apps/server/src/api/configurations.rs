use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState, models::ConfigurationView};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use posbridge_connect::models::{OrganizationInfo, TerminalGroupInfo};
use posbridge_core::configurations::{NewPosConfiguration, PosConfigurationUpdate};
use posbridge_core::menu::MenuSyncOutcome;
use serde_json::{json, Value};

async fn list_configurations(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ConfigurationView>>> {
    let configs = state.configuration_service.list_configurations()?;
    Ok(Json(configs.into_iter().map(Into::into).collect()))
}

async fn get_configuration(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ConfigurationView>> {
    let config = state.configuration_service.get_configuration(&id)?;
    Ok(Json(config.into()))
}

async fn create_configuration(
    State(state): State<Arc<AppState>>,
    Json(new_config): Json<NewPosConfiguration>,
) -> ApiResult<Json<ConfigurationView>> {
    let config = state
        .configuration_service
        .create_configuration(new_config)
        .await?;
    Ok(Json(config.into()))
}

async fn update_configuration(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<PosConfigurationUpdate>,
) -> ApiResult<Json<ConfigurationView>> {
    let config = state
        .configuration_service
        .update_configuration(&id, update)
        .await?;
    Ok(Json(config.into()))
}

async fn delete_configuration(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.configuration_service.delete_configuration(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestConnectionRequest {
    base_url: String,
    login: String,
}

/// Validates credentials against the POS without persisting anything.
/// Rejected credentials surface as the usual 502 with the POS message.
async fn test_connection(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TestConnectionRequest>,
) -> ApiResult<Json<Value>> {
    let base_url = body.base_url.trim_end_matches('/');
    let auth = state.pos_api.authenticate(base_url, &body.login).await?;
    Ok(Json(json!({
        "success": true,
        "expiresAt": auth.expires_at,
    })))
}

/// Drops the cached token on an upstream 401 so the next call refreshes
/// instead of replaying a revoked token until its local expiry.
async fn invalidate_on_auth_failure<T>(
    state: &AppState,
    config_id: &str,
    result: Result<T, posbridge_core::Error>,
) -> Result<T, posbridge_core::Error> {
    if let Err(posbridge_core::Error::Auth(_)) = &result {
        if let Err(err) = state.token_manager.invalidate(config_id).await {
            tracing::warn!(
                "Failed to drop the stale token for configuration {}: {}",
                config_id,
                err
            );
        }
    }
    result
}

async fn list_organizations(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<OrganizationInfo>>> {
    let config = state.configuration_service.get_configuration(&id)?;
    let token = state.token_manager.get_token(&config.id).await?;
    let organizations = invalidate_on_auth_failure(
        &state,
        &config.id,
        state
            .pos_api
            .list_organizations(&config.normalized_base_url(), &token)
            .await,
    )
    .await?;
    Ok(Json(organizations))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct TerminalGroupQuery {
    organization_id: Option<String>,
}

async fn list_terminal_groups(
    Path(id): Path<String>,
    Query(query): Query<TerminalGroupQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TerminalGroupInfo>>> {
    let config = state.configuration_service.get_configuration(&id)?;
    let organization_id = query
        .organization_id
        .unwrap_or_else(|| config.organization_id.clone());
    let token = state.token_manager.get_token(&config.id).await?;
    let groups = invalidate_on_auth_failure(
        &state,
        &config.id,
        state
            .pos_api
            .list_terminal_groups(&config.normalized_base_url(), &token, &organization_id)
            .await,
    )
    .await?;
    Ok(Json(groups))
}

/// Immediate menu sync for one configuration; ignores the auto-sync flag
/// and the interval gate.
async fn sync_menu(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<MenuSyncOutcome>> {
    let outcome = state.menu_sync_service.sync_menu_for_config(&id).await?;
    Ok(Json(outcome))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/configurations",
            get(list_configurations).post(create_configuration),
        )
        .route("/configurations/test-connection", post(test_connection))
        .route(
            "/configurations/{id}",
            get(get_configuration)
                .put(update_configuration)
                .delete(delete_configuration),
        )
        .route("/configurations/{id}/organizations", get(list_organizations))
        .route(
            "/configurations/{id}/terminal-groups",
            get(list_terminal_groups),
        )
        .route("/configurations/{id}/sync-menu", post(sync_menu))
}

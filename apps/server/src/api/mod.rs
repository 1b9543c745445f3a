//! Admin/ops HTTP surface.
//!
//! Everything lives under `/api`. Health is open; all other routes require
//! the bearer admin token from `PB_ADMIN_TOKEN`.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::main_lib::AppState;

pub mod configurations;
pub mod health;
pub mod mappings;
pub mod queue;
pub mod sync;

async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(ApiError::ServiceUnavailable(
            "Admin API disabled: PB_ADMIN_TOKEN is not set".to_string(),
        ));
    };
    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if provided != Some(expected) {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

pub fn app_router(state: Arc<AppState>) -> Router {
    let admin = Router::new()
        .merge(configurations::router())
        .merge(mappings::router())
        .merge(queue::router())
        .merge(sync::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let api = Router::new().merge(health::router()).merge(admin);

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

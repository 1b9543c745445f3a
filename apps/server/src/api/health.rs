use std::sync::Arc;

use crate::main_lib::AppState;
use axum::{extract::State, routing::get, Json, Router};
use posbridge_storage_sqlite::db;
use serde_json::{json, Value};

/// Liveness plus a database round-trip. Always 200; the body carries the
/// degraded flag so probes stay simple.
async fn get_health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let database = match db::get_connection(&state.pool) {
        Ok(_) => "ok",
        Err(err) => {
            tracing::warn!("Health check could not reach the database: {}", err);
            "unavailable"
        }
    };
    let status = if database == "ok" { "ok" } else { "degraded" };
    Json(json!({
        "status": status,
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

use std::sync::Arc;

use posbridge_server::api::app_router;
use posbridge_server::{build_state, init_tracing, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    init_tracing();
    let state = build_state(&config).await?;

    // Background order and menu sync loops
    state.scheduler.start();
    if config.admin_token.is_none() {
        tracing::warn!("PB_ADMIN_TOKEN is not set; admin routes will answer 503");
    }

    let router = app_router(state.clone());
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;
    Ok(())
}

async fn shutdown_signal(state: Arc<AppState>) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    tracing::info!("Shutdown signal received; stopping the scheduler");
    state.scheduler.shutdown();
}

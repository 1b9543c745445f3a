use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use posbridge_connect::{
    MenuSyncService, MenuSyncServiceTrait, OrderSyncService, OrderSyncServiceTrait, PosApi,
    PosApiClient, TokenManager,
};
use posbridge_core::{
    configurations::{ConfigurationService, ConfigurationServiceTrait},
    mappings::{CategoryMappingService, CategoryMappingServiceTrait},
    menu::MenuSyncRecordRepositoryTrait,
    orders::{OrderQueueRepositoryTrait, OrderSyncRecordRepositoryTrait},
};
use posbridge_storage_sqlite::{
    configurations::ConfigurationRepository,
    db::{self, DbPool},
    mappings::CategoryMappingRepository,
    menu::MenuSyncRecordRepository,
    orders::{OrderQueueRepository, OrderSyncRecordRepository},
    products::ProductRepository,
};

use crate::config::Config;
use crate::scheduler::Scheduler;

pub struct AppState {
    pub pool: Arc<DbPool>,
    pub configuration_service: Arc<dyn ConfigurationServiceTrait>,
    pub mapping_service: Arc<dyn CategoryMappingServiceTrait>,
    pub queue: Arc<dyn OrderQueueRepositoryTrait>,
    pub order_sync_records: Arc<dyn OrderSyncRecordRepositoryTrait>,
    pub menu_sync_records: Arc<dyn MenuSyncRecordRepositoryTrait>,
    pub order_sync_service: Arc<dyn OrderSyncServiceTrait>,
    pub menu_sync_service: Arc<dyn MenuSyncServiceTrait>,
    pub token_manager: Arc<TokenManager>,
    pub pos_api: Arc<dyn PosApi>,
    pub scheduler: Arc<Scheduler>,
    pub admin_token: Option<String>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("PB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", config.db_path);
    let pool = db::create_pool(&config.db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let configuration_repository = Arc::new(ConfigurationRepository::new(
        pool.clone(),
        writer.clone(),
    ));
    let mapping_repository = Arc::new(CategoryMappingRepository::new(
        pool.clone(),
        writer.clone(),
    ));
    let product_repository = Arc::new(ProductRepository::new(pool.clone(), writer.clone()));
    let menu_record_repository = Arc::new(MenuSyncRecordRepository::new(
        pool.clone(),
        writer.clone(),
    ));
    let queue_repository = Arc::new(OrderQueueRepository::new(pool.clone(), writer.clone()));
    let order_sync_record_repository = Arc::new(OrderSyncRecordRepository::new(
        pool.clone(),
        writer.clone(),
    ));

    let configuration_service: Arc<dyn ConfigurationServiceTrait> =
        Arc::new(ConfigurationService::new(configuration_repository.clone()));
    let mapping_service = Arc::new(CategoryMappingService::new(mapping_repository.clone()));

    let pos_api: Arc<dyn PosApi> = Arc::new(PosApiClient::new()?);
    let token_manager = Arc::new(TokenManager::new(
        configuration_repository.clone(),
        pos_api.clone(),
    ));

    let order_sync_service: Arc<dyn OrderSyncServiceTrait> = Arc::new(OrderSyncService::new(
        queue_repository.clone(),
        order_sync_record_repository.clone(),
        configuration_repository.clone(),
        token_manager.clone(),
        pos_api.clone(),
    ));
    let menu_sync_service: Arc<dyn MenuSyncServiceTrait> = Arc::new(MenuSyncService::new(
        configuration_repository.clone(),
        mapping_service.clone(),
        product_repository.clone(),
        menu_record_repository.clone(),
        token_manager.clone(),
        pos_api.clone(),
    ));

    let scheduler = Arc::new(Scheduler::new(
        order_sync_service.clone(),
        menu_sync_service.clone(),
        config.order_sync_interval_secs,
        config.menu_sync_interval_mins,
        config.order_batch_size,
    ));

    Ok(Arc::new(AppState {
        pool,
        configuration_service,
        mapping_service,
        queue: queue_repository,
        order_sync_records: order_sync_record_repository,
        menu_sync_records: menu_record_repository,
        order_sync_service,
        menu_sync_service,
        token_manager,
        pos_api,
        scheduler,
        admin_token: config.admin_token.clone(),
        db_path: config.db_path.clone(),
    }))
}

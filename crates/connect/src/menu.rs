//! Inbound menu sync: reconciles POS catalogs into the local database.
//!
//! Each run fetches one configuration's nomenclature, routes every sellable
//! product through the category mappings, and upserts the local catalog.
//! Products whose group has no mapping are quarantined for operator review
//! instead of being dropped or guessed at.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::{debug, error, info, warn};

use posbridge_core::configurations::{ConfigurationRepositoryTrait, PosConfiguration};
use posbridge_core::constants::DEFAULT_PRODUCT_STOCK;
use posbridge_core::errors::{Error, Result};
use posbridge_core::mappings::CategoryMappingServiceTrait;
use posbridge_core::menu::{
    MenuSyncOutcome, MenuSyncRecordRepositoryTrait, MenuSyncRecordUpsert, MenuSyncStatus,
    MenuSyncSummary,
};
use posbridge_core::products::{NewProduct, ProductCatalogUpdate, ProductRepositoryTrait};

use crate::auth::TokenManager;
use crate::client::PosApi;
use crate::models::{Nomenclature, PosProduct};

/// Contract exposed to the scheduler and the admin interface.
#[async_trait]
pub trait MenuSyncServiceTrait: Send + Sync {
    /// Synchronizes one configuration immediately, ignoring the auto-sync
    /// flag and the interval gating.
    async fn sync_menu_for_config(&self, config_id: &str) -> Result<MenuSyncOutcome>;

    /// Synchronizes every due active configuration, isolating failures so
    /// one broken POS cannot stall the other stores.
    async fn sync_all_menus(&self) -> Result<MenuSyncSummary>;
}

enum ProductDisposition {
    Created,
    Updated,
    Quarantined,
}

pub struct MenuSyncService {
    configurations: Arc<dyn ConfigurationRepositoryTrait>,
    mappings: Arc<dyn CategoryMappingServiceTrait>,
    products: Arc<dyn ProductRepositoryTrait>,
    menu_records: Arc<dyn MenuSyncRecordRepositoryTrait>,
    token_manager: Arc<TokenManager>,
    pos_api: Arc<dyn PosApi>,
}

impl MenuSyncService {
    pub fn new(
        configurations: Arc<dyn ConfigurationRepositoryTrait>,
        mappings: Arc<dyn CategoryMappingServiceTrait>,
        products: Arc<dyn ProductRepositoryTrait>,
        menu_records: Arc<dyn MenuSyncRecordRepositoryTrait>,
        token_manager: Arc<TokenManager>,
        pos_api: Arc<dyn PosApi>,
    ) -> Self {
        Self {
            configurations,
            mappings,
            products,
            menu_records,
            token_manager,
            pos_api,
        }
    }

    async fn sync_configuration(&self, config: &PosConfiguration) -> Result<MenuSyncOutcome> {
        info!("Menu sync for configuration '{}' ({})", config.name, config.id);
        let mut outcome = MenuSyncOutcome {
            config_id: config.id.clone(),
            config_name: config.name.clone(),
            ..Default::default()
        };

        let nomenclature = match self.fetch_catalog(config).await {
            Ok(nomenclature) => nomenclature,
            Err(err) => {
                self.record_run_failure(&config.id, &err).await;
                return Err(err);
            }
        };
        let stopped = self.fetch_stopped_products(config).await;

        let group_names: HashMap<&str, &str> = nomenclature
            .groups
            .iter()
            .filter_map(|group| group.name.as_deref().map(|name| (group.id.as_str(), name)))
            .collect();

        for product in &nomenclature.products {
            if product.is_deleted || !product.is_included_in_menu {
                continue;
            }
            let in_stop_list = stopped.contains(&product.id);
            match self
                .reconcile_product(config, product, &group_names, in_stop_list)
                .await
            {
                Ok(ProductDisposition::Created) => outcome.created += 1,
                Ok(ProductDisposition::Updated) => outcome.updated += 1,
                Ok(ProductDisposition::Quarantined) => outcome.quarantined += 1,
                Err(err) => {
                    outcome.errors += 1;
                    error!(
                        "Failed to reconcile product {} for configuration {}: {}",
                        product.id, config.id, err
                    );
                    self.record_product_error(config, product, &group_names, in_stop_list, &err)
                        .await;
                }
            }
        }

        outcome.success = true;
        outcome.revision = Some(nomenclature.revision);
        let marker = MenuSyncRecordUpsert::run_marker(&config.id, nomenclature.revision, &outcome);
        if let Err(err) = self.menu_records.upsert(marker).await {
            warn!(
                "Failed to store the run marker for configuration {}: {}",
                config.id, err
            );
        }
        info!(
            "Menu sync for configuration {} done: {} created, {} updated, {} quarantined, {} errors (revision {})",
            config.id,
            outcome.created,
            outcome.updated,
            outcome.quarantined,
            outcome.errors,
            nomenclature.revision
        );
        Ok(outcome)
    }

    async fn fetch_catalog(&self, config: &PosConfiguration) -> Result<Nomenclature> {
        let token = self.token_manager.get_token(&config.id).await?;
        match self
            .pos_api
            .fetch_nomenclature(&config.normalized_base_url(), &token, &config.organization_id)
            .await
        {
            Err(err @ Error::Auth(_)) => {
                if let Err(clear_err) = self.token_manager.invalidate(&config.id).await {
                    warn!(
                        "Failed to drop the stale token for configuration {}: {}",
                        config.id, clear_err
                    );
                }
                Err(err)
            }
            other => other,
        }
    }

    /// Stop list failures degrade to "nothing stopped": availability is
    /// advisory, the catalog itself is not.
    async fn fetch_stopped_products(&self, config: &PosConfiguration) -> HashSet<String> {
        let token = match self.token_manager.get_token(&config.id).await {
            Ok(token) => token,
            Err(err) => {
                warn!("Skipping the stop list for configuration {}: {}", config.id, err);
                return HashSet::new();
            }
        };
        match self
            .pos_api
            .fetch_stop_list(
                &config.normalized_base_url(),
                &token,
                &config.organization_id,
                config.terminal_group_id.as_deref(),
            )
            .await
        {
            Ok(items) => items.into_iter().map(|item| item.product_id).collect(),
            Err(err) => {
                if matches!(err, Error::Auth(_)) {
                    if let Err(clear_err) = self.token_manager.invalidate(&config.id).await {
                        warn!(
                            "Failed to drop the stale token for configuration {}: {}",
                            config.id, clear_err
                        );
                    }
                }
                warn!(
                    "Stop list fetch failed for configuration {}; treating it as empty: {}",
                    config.id, err
                );
                HashSet::new()
            }
        }
    }

    async fn reconcile_product(
        &self,
        config: &PosConfiguration,
        product: &PosProduct,
        group_names: &HashMap<&str, &str>,
        in_stop_list: bool,
    ) -> Result<ProductDisposition> {
        let name = product.display_name();
        let price = product.price.unwrap_or_default();
        let is_available = !in_stop_list;

        let existing = self
            .products
            .get_by_external_id(&product.id, config.store_id.as_deref())?;

        let (disposition, local_product_id) = match existing {
            Some(local) => {
                // The category of an existing product stays local; only the
                // POS-owned fields follow the catalog.
                let update = ProductCatalogUpdate {
                    name: name.clone(),
                    description: product.description.clone(),
                    price,
                    is_available,
                };
                self.products.apply_catalog_update(&local.id, update).await?;
                (ProductDisposition::Updated, Some(local.id))
            }
            None => {
                let category_id = match &product.parent_group_id {
                    Some(group_id) => self
                        .mappings
                        .resolve_category(group_id, config.store_id.as_deref())?,
                    None => None,
                };
                match category_id {
                    Some(category_id) => {
                        let created = self
                            .products
                            .create(NewProduct {
                                id: None,
                                store_id: config.store_id.clone(),
                                category_id,
                                external_id: product.id.clone(),
                                name: name.clone(),
                                description: product.description.clone(),
                                price,
                                stock_quantity: DEFAULT_PRODUCT_STOCK,
                                is_active: true,
                                is_available,
                            })
                            .await?;
                        (ProductDisposition::Created, Some(created.id))
                    }
                    None => {
                        debug!(
                            "Product {} ('{}') has no category mapping; quarantining",
                            product.id, name
                        );
                        (ProductDisposition::Quarantined, None)
                    }
                }
            }
        };

        let status = match disposition {
            ProductDisposition::Quarantined => MenuSyncStatus::Quarantined,
            _ => MenuSyncStatus::Synced,
        };
        self.menu_records
            .upsert(record_for(
                config,
                product,
                group_names,
                local_product_id,
                in_stop_list,
                status,
            ))
            .await?;
        Ok(disposition)
    }

    async fn record_product_error(
        &self,
        config: &PosConfiguration,
        product: &PosProduct,
        group_names: &HashMap<&str, &str>,
        in_stop_list: bool,
        err: &Error,
    ) {
        let mut record = record_for(
            config,
            product,
            group_names,
            None,
            in_stop_list,
            MenuSyncStatus::Error,
        );
        record.snapshot = Some(
            serde_json::json!({
                "error": err.to_string(),
                "product": product,
            })
            .to_string(),
        );
        if let Err(record_err) = self.menu_records.upsert(record).await {
            warn!(
                "Failed to record the error for product {}: {}",
                product.id, record_err
            );
        }
    }

    async fn record_run_failure(&self, config_id: &str, err: &Error) {
        error!("Menu sync failed for configuration {}: {}", config_id, err);
        let marker = MenuSyncRecordUpsert::run_error_marker(config_id, &err.to_string());
        if let Err(record_err) = self.menu_records.upsert(marker).await {
            warn!(
                "Failed to store the failure marker for configuration {}: {}",
                config_id, record_err
            );
        }
    }

    /// Gating for the periodic pass: the per-configuration flag and
    /// interval. A failed run does not push the next attempt out.
    fn is_due(&self, config: &PosConfiguration) -> bool {
        if !config.auto_sync {
            debug!("Configuration {} has auto-sync off; skipping", config.id);
            return false;
        }
        let marker = match self.menu_records.last_run_marker(&config.id) {
            Ok(marker) => marker,
            Err(err) => {
                warn!(
                    "Could not read the run marker for configuration {}: {}",
                    config.id, err
                );
                return true;
            }
        };
        match marker {
            Some(marker) if marker.sync_status == MenuSyncStatus::RunSuccess => {
                let next_due =
                    marker.last_synced_at + Duration::minutes(config.sync_interval_minutes as i64);
                if next_due > Utc::now() {
                    debug!(
                        "Configuration {} synced recently; next run after {}",
                        config.id, next_due
                    );
                    return false;
                }
                true
            }
            _ => true,
        }
    }
}

/// Builds the per-product record stored after reconciliation.
fn record_for(
    config: &PosConfiguration,
    product: &PosProduct,
    group_names: &HashMap<&str, &str>,
    local_product_id: Option<String>,
    in_stop_list: bool,
    sync_status: MenuSyncStatus,
) -> MenuSyncRecordUpsert {
    let group_name = product
        .parent_group_id
        .as_deref()
        .and_then(|id| group_names.get(id))
        .map(|name| name.to_string());
    MenuSyncRecordUpsert {
        config_id: config.id.clone(),
        external_product_id: product.id.clone(),
        external_product_name: product.name.clone(),
        external_group_id: product.parent_group_id.clone(),
        external_group_name: group_name,
        local_product_id,
        snapshot: serde_json::to_string(product).ok(),
        price: product.price,
        is_available: !in_stop_list,
        is_in_stop_list: in_stop_list,
        sync_status,
    }
}

#[async_trait]
impl MenuSyncServiceTrait for MenuSyncService {
    async fn sync_menu_for_config(&self, config_id: &str) -> Result<MenuSyncOutcome> {
        let config = self.configurations.get_by_id(config_id)?;
        self.sync_configuration(&config).await
    }

    async fn sync_all_menus(&self) -> Result<MenuSyncSummary> {
        let configs = self.configurations.list(Some(true))?;
        let mut summary = MenuSyncSummary {
            total: configs.len() as u32,
            ..Default::default()
        };
        debug!("Menu sync pass over {} active configurations", summary.total);

        for config in configs {
            if !self.is_due(&config) {
                summary.skipped += 1;
                continue;
            }
            match self.sync_configuration(&config).await {
                Ok(outcome) => {
                    summary.succeeded += 1;
                    summary.results.push(outcome);
                }
                Err(err) => {
                    summary.failed += 1;
                    summary.results.push(MenuSyncOutcome {
                        config_id: config.id.clone(),
                        config_name: config.name.clone(),
                        success: false,
                        error_message: Some(err.to_string()),
                        ..Default::default()
                    });
                }
            }
        }

        info!(
            "Menu sync pass done: {} succeeded, {} failed, {} skipped",
            summary.succeeded, summary.failed, summary.skipped
        );
        Ok(summary)
    }
}

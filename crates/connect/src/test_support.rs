//! Shared in-memory fakes for service tests.
//!
//! The fakes mirror the semantics of the real repositories closely enough
//! for service-level tests: guarded status transitions, exact store scoping,
//! and the sentinel-row rules all behave like the SQLite implementations.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal_macros::dec;

use posbridge_core::configurations::{
    ConfigurationRepositoryTrait, NewPosConfiguration, PosConfiguration, PosConfigurationUpdate,
};
use posbridge_core::constants::{MENU_SYNC_RUN_MARKER, ORDER_PAYLOAD_VERSION};
use posbridge_core::errors::{AuthError, DatabaseError, NetworkError, Result};
use posbridge_core::mappings::{
    CategoryMapping, CategoryMappingServiceTrait, CategoryMappingUpdate, NewCategoryMapping,
};
use posbridge_core::menu::{
    MenuSyncRecord, MenuSyncRecordRepositoryTrait, MenuSyncRecordUpsert, MenuSyncStatus,
};
use posbridge_core::orders::{
    NewOrderQueueEntry, OrderLine, OrderPayload, OrderQueueEntry, OrderQueueRepositoryTrait,
    OrderSyncRecord, OrderSyncRecordRepositoryTrait, OrderSyncStatus, QueueEntryStatus,
};
use posbridge_core::products::{NewProduct, Product, ProductCatalogUpdate, ProductRepositoryTrait};

use crate::client::PosApi;
use crate::models::{
    AuthResponse, CreateOrderRequest, CreateOrderResponse, Nomenclature, OrganizationInfo,
    StopListItem, TerminalGroupInfo,
};

// ==================== Fixtures ====================

pub fn config_fixture(id: &str, store_id: Option<&str>) -> PosConfiguration {
    let now = Utc::now();
    PosConfiguration {
        id: id.to_string(),
        name: format!("Config {}", id),
        store_id: store_id.map(str::to_string),
        base_url: "https://pos.example.com".to_string(),
        login: "api-login".to_string(),
        organization_id: "org-1".to_string(),
        organization_name: None,
        terminal_group_id: Some("tg-1".to_string()),
        terminal_group_name: None,
        auto_sync: true,
        sync_interval_minutes: 30,
        is_active: true,
        cached_token: None,
        token_expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn new_entry_fixture(
    order_id: &str,
    order_number: &str,
    store_id: Option<&str>,
) -> NewOrderQueueEntry {
    NewOrderQueueEntry {
        order_id: order_id.to_string(),
        order_number: order_number.to_string(),
        store_id: store_id.map(str::to_string),
        payload: OrderPayload {
            schema_version: ORDER_PAYLOAD_VERSION,
            order_id: order_id.to_string(),
            order_number: order_number.to_string(),
            store_id: store_id.map(str::to_string),
            customer: None,
            items: vec![OrderLine {
                external_product_id: "ext-1".to_string(),
                name: "Espresso".to_string(),
                quantity: dec!(2),
                unit_price: dec!(3.50),
            }],
            comment: None,
            total: dec!(7.00),
            placed_at: Utc::now(),
        },
        priority: 0,
        max_retries: 3,
    }
}

fn not_found(what: &str) -> posbridge_core::Error {
    DatabaseError::NotFound(what.to_string()).into()
}

// ==================== POS double ====================

/// What the next scripted `create_order` call should do. An empty script
/// means every push succeeds.
pub enum OrderPushOutcome {
    Unauthorized,
    Unreachable,
}

/// Programmable POS double. Counters record call volume; the knobs inject
/// failures per endpoint.
#[derive(Default)]
pub struct MockPosApi {
    pub auth_calls: AtomicUsize,
    pub organization_calls: AtomicUsize,
    pub nomenclature_calls: AtomicUsize,
    pub stop_list_calls: AtomicUsize,
    pub order_calls: AtomicUsize,
    /// Sleep inside `authenticate`, to force overlap in concurrency tests.
    pub auth_delay_ms: AtomicU64,
    pub reject_credentials: AtomicBool,
    pub fail_stop_list: AtomicBool,
    pub reject_stop_list_token: AtomicBool,
    nomenclature: RwLock<Nomenclature>,
    fail_nomenclature_orgs: RwLock<HashSet<String>>,
    stop_list: RwLock<Vec<StopListItem>>,
    order_outcomes: Mutex<VecDeque<OrderPushOutcome>>,
    last_order: Mutex<Option<CreateOrderRequest>>,
}

impl MockPosApi {
    pub fn set_nomenclature(&self, nomenclature: Nomenclature) {
        *self.nomenclature.write().unwrap() = nomenclature;
    }

    pub fn set_stop_list(&self, items: Vec<StopListItem>) {
        *self.stop_list.write().unwrap() = items;
    }

    /// Makes `fetch_nomenclature` fail for one organization only.
    pub fn fail_nomenclature_for(&self, organization_id: &str) {
        self.fail_nomenclature_orgs
            .write()
            .unwrap()
            .insert(organization_id.to_string());
    }

    pub fn push_order_outcome(&self, outcome: OrderPushOutcome) {
        self.order_outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn last_order(&self) -> Option<CreateOrderRequest> {
        self.last_order.lock().unwrap().clone()
    }
}

#[async_trait]
impl PosApi for MockPosApi {
    async fn authenticate(&self, _base_url: &str, _login: &str) -> Result<AuthResponse> {
        let delay = self.auth_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        let call = self.auth_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.reject_credentials.load(Ordering::SeqCst) {
            return Err(AuthError::CredentialsRejected("login rejected".to_string()).into());
        }
        Ok(AuthResponse {
            token: format!("tok-{}", call),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        })
    }

    async fn list_organizations(
        &self,
        _base_url: &str,
        _token: &str,
    ) -> Result<Vec<OrganizationInfo>> {
        self.organization_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![OrganizationInfo {
            id: "org-1".to_string(),
            name: Some("Main".to_string()),
        }])
    }

    async fn list_terminal_groups(
        &self,
        _base_url: &str,
        _token: &str,
        organization_id: &str,
    ) -> Result<Vec<TerminalGroupInfo>> {
        Ok(vec![TerminalGroupInfo {
            id: "tg-1".to_string(),
            name: Some("Front".to_string()),
            organization_id: Some(organization_id.to_string()),
        }])
    }

    async fn fetch_nomenclature(
        &self,
        _base_url: &str,
        _token: &str,
        organization_id: &str,
    ) -> Result<Nomenclature> {
        self.nomenclature_calls.fetch_add(1, Ordering::SeqCst);
        if self
            .fail_nomenclature_orgs
            .read()
            .unwrap()
            .contains(organization_id)
        {
            return Err(NetworkError::Unreachable("connection refused".to_string()).into());
        }
        Ok(self.nomenclature.read().unwrap().clone())
    }

    async fn fetch_stop_list(
        &self,
        _base_url: &str,
        _token: &str,
        _organization_id: &str,
        _terminal_group_id: Option<&str>,
    ) -> Result<Vec<StopListItem>> {
        self.stop_list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_stop_list.load(Ordering::SeqCst) {
            return Err(NetworkError::Timeout(15).into());
        }
        if self.reject_stop_list_token.load(Ordering::SeqCst) {
            return Err(AuthError::CredentialsRejected("token expired".to_string()).into());
        }
        Ok(self.stop_list.read().unwrap().clone())
    }

    async fn create_order(
        &self,
        _base_url: &str,
        _token: &str,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_order.lock().unwrap() = Some(request.clone());
        let scripted = self.order_outcomes.lock().unwrap().pop_front();
        if let Some(outcome) = scripted {
            return match outcome {
                OrderPushOutcome::Unauthorized => {
                    Err(AuthError::CredentialsRejected("token expired".to_string()).into())
                }
                OrderPushOutcome::Unreachable => {
                    Err(NetworkError::Unreachable("connection refused".to_string()).into())
                }
            };
        }
        Ok(CreateOrderResponse {
            order_id: format!("pos-{}", request.order.external_number),
            ticket_number: Some(format!("T-{}", request.order.external_number)),
        })
    }
}

// ==================== Configurations ====================

#[derive(Default)]
pub struct InMemoryConfigurations {
    rows: RwLock<HashMap<String, PosConfiguration>>,
    next_id: AtomicUsize,
}

impl InMemoryConfigurations {
    pub fn insert(&self, config: PosConfiguration) {
        self.rows.write().unwrap().insert(config.id.clone(), config);
    }

    pub fn get(&self, config_id: &str) -> Option<PosConfiguration> {
        self.rows.read().unwrap().get(config_id).cloned()
    }
}

#[async_trait]
impl ConfigurationRepositoryTrait for InMemoryConfigurations {
    async fn create(&self, new_config: NewPosConfiguration) -> Result<PosConfiguration> {
        new_config.validate()?;
        let id = new_config
            .id
            .clone()
            .unwrap_or_else(|| format!("cfg-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1));
        let now = Utc::now();
        let config = PosConfiguration {
            id: id.clone(),
            name: new_config.name,
            store_id: new_config.store_id,
            base_url: new_config.base_url,
            login: new_config.login,
            organization_id: new_config.organization_id,
            organization_name: new_config.organization_name,
            terminal_group_id: new_config.terminal_group_id,
            terminal_group_name: new_config.terminal_group_name,
            auto_sync: new_config.auto_sync,
            sync_interval_minutes: new_config.sync_interval_minutes,
            is_active: new_config.is_active,
            cached_token: None,
            token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        self.insert(config.clone());
        Ok(config)
    }

    async fn update(
        &self,
        config_id: &str,
        update: PosConfigurationUpdate,
    ) -> Result<PosConfiguration> {
        update.validate()?;
        let mut rows = self.rows.write().unwrap();
        let config = rows.get_mut(config_id).ok_or_else(|| not_found(config_id))?;
        if let Some(name) = update.name {
            config.name = name;
        }
        if let Some(store_id) = update.store_id {
            config.store_id = store_id;
        }
        if let Some(base_url) = update.base_url {
            config.base_url = base_url;
        }
        if let Some(login) = update.login {
            config.login = login;
        }
        if let Some(organization_id) = update.organization_id {
            config.organization_id = organization_id;
        }
        if let Some(organization_name) = update.organization_name {
            config.organization_name = organization_name;
        }
        if let Some(terminal_group_id) = update.terminal_group_id {
            config.terminal_group_id = terminal_group_id;
        }
        if let Some(terminal_group_name) = update.terminal_group_name {
            config.terminal_group_name = terminal_group_name;
        }
        if let Some(auto_sync) = update.auto_sync {
            config.auto_sync = auto_sync;
        }
        if let Some(interval) = update.sync_interval_minutes {
            config.sync_interval_minutes = interval;
        }
        if let Some(is_active) = update.is_active {
            config.is_active = is_active;
        }
        config.updated_at = Utc::now();
        Ok(config.clone())
    }

    async fn delete(&self, config_id: &str) -> Result<usize> {
        Ok(usize::from(
            self.rows.write().unwrap().remove(config_id).is_some(),
        ))
    }

    fn get_by_id(&self, config_id: &str) -> Result<PosConfiguration> {
        self.get(config_id).ok_or_else(|| not_found(config_id))
    }

    fn get_active_by_store(&self, store_id: &str) -> Result<Option<PosConfiguration>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .values()
            .filter(|c| c.is_active && c.store_id.as_deref() == Some(store_id))
            .max_by_key(|c| c.updated_at)
            .cloned())
    }

    fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<PosConfiguration>> {
        let mut configs: Vec<PosConfiguration> = self
            .rows
            .read()
            .unwrap()
            .values()
            .filter(|c| is_active_filter.is_none_or(|active| c.is_active == active))
            .cloned()
            .collect();
        configs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(configs)
    }

    async fn store_token(
        &self,
        config_id: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut rows = self.rows.write().unwrap();
        let config = rows.get_mut(config_id).ok_or_else(|| not_found(config_id))?;
        // Mirrors the real repository: a token refresh does not touch
        // updated_at.
        config.cached_token = Some(token.to_string());
        config.token_expires_at = Some(expires_at);
        Ok(())
    }

    async fn clear_token(&self, config_id: &str) -> Result<()> {
        let mut rows = self.rows.write().unwrap();
        let config = rows.get_mut(config_id).ok_or_else(|| not_found(config_id))?;
        config.cached_token = None;
        config.token_expires_at = None;
        Ok(())
    }
}

// ==================== Order queue ====================

#[derive(Default)]
pub struct InMemoryQueue {
    entries: RwLock<Vec<OrderQueueEntry>>,
    next_id: AtomicUsize,
}

impl InMemoryQueue {
    pub fn only_entry(&self) -> OrderQueueEntry {
        let entries = self.entries.read().unwrap();
        assert_eq!(entries.len(), 1, "expected exactly one queue entry");
        entries[0].clone()
    }

    /// Lets a test reclaim a retried entry without waiting out the backoff.
    pub fn clear_backoff(&self, order_id: &str) {
        let mut entries = self.entries.write().unwrap();
        for entry in entries.iter_mut().filter(|e| e.order_id == order_id) {
            entry.not_before = None;
        }
    }
}

#[async_trait]
impl OrderQueueRepositoryTrait for InMemoryQueue {
    async fn enqueue(&self, new_entry: NewOrderQueueEntry) -> Result<OrderQueueEntry> {
        new_entry.validate()?;
        let entry = OrderQueueEntry {
            id: format!("q-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            order_id: new_entry.order_id,
            order_number: new_entry.order_number,
            store_id: new_entry.store_id,
            payload: serde_json::to_string(&new_entry.payload)?,
            status: QueueEntryStatus::Pending,
            priority: new_entry.priority,
            retry_count: 0,
            max_retries: new_entry.max_retries,
            not_before: None,
            error_message: None,
            created_at: Utc::now(),
            processed_at: None,
            completed_at: None,
        };
        self.entries.write().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn claim_batch(&self, limit: i64) -> Result<Vec<OrderQueueEntry>> {
        let now = Utc::now();
        let mut entries = self.entries.write().unwrap();
        let mut eligible: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                e.status == QueueEntryStatus::Pending
                    && e.not_before.is_none_or(|not_before| not_before <= now)
            })
            .map(|(i, _)| i)
            .collect();
        eligible.sort_by(|&a, &b| {
            entries[b]
                .priority
                .cmp(&entries[a].priority)
                .then(entries[a].created_at.cmp(&entries[b].created_at))
        });
        eligible.truncate(limit.max(0) as usize);

        let mut claimed = Vec::with_capacity(eligible.len());
        for index in eligible {
            let entry = &mut entries[index];
            entry.status = QueueEntryStatus::Processing;
            entry.processed_at = Some(now);
            claimed.push(entry.clone());
        }
        Ok(claimed)
    }

    async fn mark_completed(&self, entry_id: &str) -> Result<OrderQueueEntry> {
        self.transition(entry_id, |entry| {
            entry.status = QueueEntryStatus::Completed;
            entry.completed_at = Some(Utc::now());
            entry.error_message = None;
        })
    }

    async fn mark_retry(
        &self,
        entry_id: &str,
        retry_count: i32,
        error_message: &str,
        not_before: DateTime<Utc>,
    ) -> Result<OrderQueueEntry> {
        self.transition(entry_id, |entry| {
            entry.status = QueueEntryStatus::Pending;
            entry.retry_count = retry_count;
            entry.error_message = Some(error_message.to_string());
            entry.not_before = Some(not_before);
        })
    }

    async fn mark_failed(
        &self,
        entry_id: &str,
        retry_count: i32,
        error_message: &str,
    ) -> Result<OrderQueueEntry> {
        self.transition(entry_id, |entry| {
            entry.status = QueueEntryStatus::Failed;
            entry.retry_count = retry_count;
            entry.error_message = Some(error_message.to_string());
        })
    }

    fn get_by_id(&self, entry_id: &str) -> Result<OrderQueueEntry> {
        self.entries
            .read()
            .unwrap()
            .iter()
            .find(|e| e.id == entry_id)
            .cloned()
            .ok_or_else(|| not_found(entry_id))
    }

    fn list(
        &self,
        status_filter: Option<QueueEntryStatus>,
        limit: i64,
    ) -> Result<Vec<OrderQueueEntry>> {
        let mut entries: Vec<OrderQueueEntry> = self
            .entries
            .read()
            .unwrap()
            .iter()
            .filter(|e| status_filter.is_none_or(|status| e.status == status))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit.max(0) as usize);
        Ok(entries)
    }

    fn count_by_status(&self, status: QueueEntryStatus) -> Result<i64> {
        Ok(self
            .entries
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.status == status)
            .count() as i64)
    }
}

impl InMemoryQueue {
    /// Guarded transition out of `processing`, like the real queue.
    fn transition(
        &self,
        entry_id: &str,
        apply: impl FnOnce(&mut OrderQueueEntry),
    ) -> Result<OrderQueueEntry> {
        let mut entries = self.entries.write().unwrap();
        let entry = entries
            .iter_mut()
            .find(|e| e.id == entry_id && e.status == QueueEntryStatus::Processing)
            .ok_or_else(|| not_found(entry_id))?;
        apply(entry);
        Ok(entry.clone())
    }
}

// ==================== Order sync records ====================

#[derive(Default)]
pub struct InMemorySyncRecords {
    records: RwLock<HashMap<String, OrderSyncRecord>>,
}

impl InMemorySyncRecords {
    pub fn get(&self, order_id: &str) -> Option<OrderSyncRecord> {
        self.records.read().unwrap().get(order_id).cloned()
    }

    /// Seeds a successful record, as a previous worker pass would have.
    pub fn seed_success(&self, order_id: &str, order_number: &str, external_order_id: &str) {
        let now = Utc::now();
        self.records.write().unwrap().insert(
            order_id.to_string(),
            OrderSyncRecord {
                order_id: order_id.to_string(),
                order_number: order_number.to_string(),
                external_order_id: Some(external_order_id.to_string()),
                external_ticket_number: None,
                sync_status: OrderSyncStatus::Success,
                attempts: 1,
                error_code: None,
                error_message: None,
                last_synced_at: Some(now),
                created_at: now,
                updated_at: now,
            },
        );
    }
}

#[async_trait]
impl OrderSyncRecordRepositoryTrait for InMemorySyncRecords {
    async fn mark_attempt(&self, order_id: &str, order_number: &str) -> Result<OrderSyncRecord> {
        let mut records = self.records.write().unwrap();
        let now = Utc::now();
        let record = records
            .entry(order_id.to_string())
            .or_insert_with(|| OrderSyncRecord {
                order_id: order_id.to_string(),
                order_number: order_number.to_string(),
                external_order_id: None,
                external_ticket_number: None,
                sync_status: OrderSyncStatus::Pending,
                attempts: 0,
                error_code: None,
                error_message: None,
                last_synced_at: None,
                created_at: now,
                updated_at: now,
            });
        record.sync_status = OrderSyncStatus::Syncing;
        record.attempts += 1;
        record.updated_at = now;
        Ok(record.clone())
    }

    async fn mark_success(
        &self,
        order_id: &str,
        external_order_id: &str,
        external_ticket_number: Option<&str>,
    ) -> Result<OrderSyncRecord> {
        let mut records = self.records.write().unwrap();
        let record = records.get_mut(order_id).ok_or_else(|| not_found(order_id))?;
        record.sync_status = OrderSyncStatus::Success;
        record.external_order_id = Some(external_order_id.to_string());
        record.external_ticket_number = external_ticket_number.map(str::to_string);
        record.error_code = None;
        record.error_message = None;
        record.last_synced_at = Some(Utc::now());
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn mark_failure(
        &self,
        order_id: &str,
        error_code: Option<&str>,
        error_message: &str,
    ) -> Result<OrderSyncRecord> {
        let mut records = self.records.write().unwrap();
        let record = records.get_mut(order_id).ok_or_else(|| not_found(order_id))?;
        record.sync_status = OrderSyncStatus::Failed;
        record.error_code = error_code.map(str::to_string);
        record.error_message = Some(error_message.to_string());
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    fn get_by_order_id(&self, order_id: &str) -> Result<Option<OrderSyncRecord>> {
        Ok(self.get(order_id))
    }

    fn find_success_by_order_number(&self, order_number: &str) -> Result<Option<OrderSyncRecord>> {
        Ok(self
            .records
            .read()
            .unwrap()
            .values()
            .filter(|r| {
                r.order_number == order_number && r.sync_status == OrderSyncStatus::Success
            })
            .max_by_key(|r| r.updated_at)
            .cloned())
    }

    fn list_recent(&self, limit: i64) -> Result<Vec<OrderSyncRecord>> {
        let mut records: Vec<OrderSyncRecord> =
            self.records.read().unwrap().values().cloned().collect();
        records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }
}

// ==================== Category mappings ====================

#[derive(Default)]
pub struct InMemoryMappings {
    rows: RwLock<Vec<CategoryMapping>>,
    next_id: AtomicUsize,
}

impl InMemoryMappings {
    pub fn map_group(&self, external_group_id: &str, store_id: Option<&str>, category_id: &str) {
        let now = Utc::now();
        let id = format!("map-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.rows.write().unwrap().push(CategoryMapping {
            id,
            external_group_id: external_group_id.to_string(),
            external_group_name: None,
            local_category_id: category_id.to_string(),
            store_id: store_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        });
    }
}

#[async_trait]
impl CategoryMappingServiceTrait for InMemoryMappings {
    async fn create_mapping(&self, new_mapping: NewCategoryMapping) -> Result<CategoryMapping> {
        new_mapping.validate()?;
        self.map_group(
            &new_mapping.external_group_id,
            new_mapping.store_id.as_deref(),
            &new_mapping.local_category_id,
        );
        Ok(self.rows.read().unwrap().last().cloned().unwrap())
    }

    async fn update_mapping(
        &self,
        mapping_id: &str,
        update: CategoryMappingUpdate,
    ) -> Result<CategoryMapping> {
        update.validate()?;
        let mut rows = self.rows.write().unwrap();
        let mapping = rows
            .iter_mut()
            .find(|m| m.id == mapping_id)
            .ok_or_else(|| not_found(mapping_id))?;
        if let Some(name) = update.external_group_name {
            mapping.external_group_name = name;
        }
        if let Some(category_id) = update.local_category_id {
            mapping.local_category_id = category_id;
        }
        if let Some(store_id) = update.store_id {
            mapping.store_id = store_id;
        }
        mapping.updated_at = Utc::now();
        Ok(mapping.clone())
    }

    async fn delete_mapping(&self, mapping_id: &str) -> Result<()> {
        self.rows.write().unwrap().retain(|m| m.id != mapping_id);
        Ok(())
    }

    fn get_mapping(&self, mapping_id: &str) -> Result<CategoryMapping> {
        self.rows
            .read()
            .unwrap()
            .iter()
            .find(|m| m.id == mapping_id)
            .cloned()
            .ok_or_else(|| not_found(mapping_id))
    }

    fn list_mappings(&self, store_id: Option<&str>) -> Result<Vec<CategoryMapping>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .filter(|m| m.store_id.is_none() || m.store_id.as_deref() == store_id)
            .cloned()
            .collect())
    }

    fn resolve_category(
        &self,
        external_group_id: &str,
        store_id: Option<&str>,
    ) -> Result<Option<String>> {
        let rows = self.rows.read().unwrap();
        // Store-scoped row wins over the global fallback.
        if let Some(store_id) = store_id {
            if let Some(mapping) = rows.iter().find(|m| {
                m.external_group_id == external_group_id
                    && m.store_id.as_deref() == Some(store_id)
            }) {
                return Ok(Some(mapping.local_category_id.clone()));
            }
        }
        Ok(rows
            .iter()
            .find(|m| m.external_group_id == external_group_id && m.store_id.is_none())
            .map(|m| m.local_category_id.clone()))
    }
}

// ==================== Products ====================

#[derive(Default)]
pub struct InMemoryProducts {
    rows: RwLock<Vec<Product>>,
    next_id: AtomicUsize,
    fail_create_for: RwLock<Option<String>>,
}

impl InMemoryProducts {
    pub fn count(&self) -> usize {
        self.rows.read().unwrap().len()
    }

    pub fn by_external(&self, external_id: &str) -> Option<Product> {
        self.rows
            .read()
            .unwrap()
            .iter()
            .find(|p| p.external_id == external_id)
            .cloned()
    }

    /// Makes `create` fail for one external id, to test fault isolation.
    pub fn fail_create_for(&self, external_id: &str) {
        *self.fail_create_for.write().unwrap() = Some(external_id.to_string());
    }
}

#[async_trait]
impl ProductRepositoryTrait for InMemoryProducts {
    async fn create(&self, new_product: NewProduct) -> Result<Product> {
        if self.fail_create_for.read().unwrap().as_deref() == Some(new_product.external_id.as_str())
        {
            return Err(DatabaseError::QueryFailed("injected failure".to_string()).into());
        }
        let now = Utc::now();
        let product = Product {
            id: new_product
                .id
                .unwrap_or_else(|| format!("p-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)),
            store_id: new_product.store_id,
            category_id: new_product.category_id,
            external_id: new_product.external_id,
            name: new_product.name,
            description: new_product.description,
            price: new_product.price,
            stock_quantity: new_product.stock_quantity,
            is_active: new_product.is_active,
            is_available: new_product.is_available,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().unwrap().push(product.clone());
        Ok(product)
    }

    async fn apply_catalog_update(
        &self,
        product_id: &str,
        update: ProductCatalogUpdate,
    ) -> Result<Product> {
        let mut rows = self.rows.write().unwrap();
        let product = rows
            .iter_mut()
            .find(|p| p.id == product_id)
            .ok_or_else(|| not_found(product_id))?;
        product.name = update.name;
        product.description = update.description;
        product.price = update.price;
        product.is_available = update.is_available;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    fn get_by_external_id(
        &self,
        external_id: &str,
        store_id: Option<&str>,
    ) -> Result<Option<Product>> {
        // Exact scope match, like the SQLite repository: None only finds
        // global rows.
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .find(|p| p.external_id == external_id && p.store_id.as_deref() == store_id)
            .cloned())
    }

    fn list(&self, store_id: Option<&str>) -> Result<Vec<Product>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .iter()
            .filter(|p| store_id.is_none() || p.store_id.as_deref() == store_id)
            .cloned()
            .collect())
    }
}

// ==================== Menu sync records ====================

#[derive(Default)]
pub struct InMemoryMenuRecords {
    rows: RwLock<HashMap<(String, String), MenuSyncRecord>>,
}

impl InMemoryMenuRecords {
    pub fn record(&self, config_id: &str, external_product_id: &str) -> Option<MenuSyncRecord> {
        self.rows
            .read()
            .unwrap()
            .get(&(config_id.to_string(), external_product_id.to_string()))
            .cloned()
    }

    /// Backdates a record, to put a configuration past its sync interval.
    pub fn backdate(&self, config_id: &str, external_product_id: &str, minutes: i64) {
        let mut rows = self.rows.write().unwrap();
        if let Some(record) =
            rows.get_mut(&(config_id.to_string(), external_product_id.to_string()))
        {
            record.last_synced_at = Utc::now() - Duration::minutes(minutes);
        }
    }
}

#[async_trait]
impl MenuSyncRecordRepositoryTrait for InMemoryMenuRecords {
    async fn upsert(&self, record: MenuSyncRecordUpsert) -> Result<MenuSyncRecord> {
        let stored = MenuSyncRecord {
            config_id: record.config_id.clone(),
            external_product_id: record.external_product_id.clone(),
            external_product_name: record.external_product_name,
            external_group_id: record.external_group_id,
            external_group_name: record.external_group_name,
            local_product_id: record.local_product_id,
            snapshot: record.snapshot,
            price: record.price,
            is_available: record.is_available,
            is_in_stop_list: record.is_in_stop_list,
            sync_status: record.sync_status,
            last_synced_at: Utc::now(),
        };
        self.rows.write().unwrap().insert(
            (record.config_id, record.external_product_id),
            stored.clone(),
        );
        Ok(stored)
    }

    fn get(
        &self,
        config_id: &str,
        external_product_id: &str,
    ) -> Result<Option<MenuSyncRecord>> {
        Ok(self.record(config_id, external_product_id))
    }

    fn list_for_config(
        &self,
        config_id: &str,
        status_filter: Option<MenuSyncStatus>,
    ) -> Result<Vec<MenuSyncRecord>> {
        Ok(self
            .rows
            .read()
            .unwrap()
            .values()
            .filter(|r| r.config_id == config_id)
            .filter(|r| match status_filter {
                Some(status) => r.sync_status == status,
                None => r.external_product_id != MENU_SYNC_RUN_MARKER,
            })
            .cloned()
            .collect())
    }

    fn last_run_marker(&self, config_id: &str) -> Result<Option<MenuSyncRecord>> {
        Ok(self.record(config_id, MENU_SYNC_RUN_MARKER))
    }
}

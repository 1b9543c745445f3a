//! Outbound order sync: drains the durable queue into the POS.
//!
//! The scheduler calls [`OrderSyncServiceTrait::run_once`] on a fixed
//! cadence. Each pass claims a batch of pending entries, pushes them, and
//! records the per-order outcome; failures land back in the queue with
//! exponential backoff until the retry budget runs out.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info, warn};

use posbridge_core::configurations::{ConfigurationRepositoryTrait, PosConfiguration};
use posbridge_core::errors::{CapacityError, ConfigurationError, Error, Result};
use posbridge_core::orders::{
    retry_backoff, NewOrderQueueEntry, OrderQueueEntry, OrderQueueRepositoryTrait,
    OrderSyncRecordRepositoryTrait, OrderSyncRunSummary,
};

use crate::auth::TokenManager;
use crate::client::PosApi;
use crate::models::{CreateOrderRequest, CreateOrderResponse};

/// Contract exposed to the scheduler and the admin interface.
#[async_trait]
pub trait OrderSyncServiceTrait: Send + Sync {
    /// Validates and enqueues an order for delivery to the POS.
    async fn enqueue_order(&self, new_entry: NewOrderQueueEntry) -> Result<OrderQueueEntry>;

    /// Claims and processes one batch of pending entries.
    async fn run_once(&self, batch_limit: i64) -> Result<OrderSyncRunSummary>;
}

enum Disposition {
    Completed,
    Retried,
    Failed,
}

pub struct OrderSyncService {
    queue: Arc<dyn OrderQueueRepositoryTrait>,
    sync_records: Arc<dyn OrderSyncRecordRepositoryTrait>,
    configurations: Arc<dyn ConfigurationRepositoryTrait>,
    token_manager: Arc<TokenManager>,
    pos_api: Arc<dyn PosApi>,
}

impl OrderSyncService {
    pub fn new(
        queue: Arc<dyn OrderQueueRepositoryTrait>,
        sync_records: Arc<dyn OrderSyncRecordRepositoryTrait>,
        configurations: Arc<dyn ConfigurationRepositoryTrait>,
        token_manager: Arc<TokenManager>,
        pos_api: Arc<dyn PosApi>,
    ) -> Self {
        Self {
            queue,
            sync_records,
            configurations,
            token_manager,
            pos_api,
        }
    }

    /// Resolves the configuration an entry should be delivered through.
    fn resolve_configuration(&self, entry: &OrderQueueEntry) -> Result<PosConfiguration> {
        match entry.store_id.as_deref() {
            Some(store_id) => self
                .configurations
                .get_active_by_store(store_id)?
                .ok_or_else(|| ConfigurationError::NoActiveForStore(store_id.to_string()).into()),
            None => {
                // Entries without a store come from single-profile installs;
                // the most recently updated active configuration wins.
                let mut active = self.configurations.list(Some(true))?;
                active.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
                active
                    .into_iter()
                    .next()
                    .ok_or_else(|| ConfigurationError::NoActiveForStore("(none)".to_string()).into())
            }
        }
    }

    async fn push_entry(
        &self,
        entry: &OrderQueueEntry,
        config: &PosConfiguration,
    ) -> Result<CreateOrderResponse> {
        let payload = entry.parse_payload()?;
        let token = self.token_manager.get_token(&config.id).await?;
        let request = CreateOrderRequest::from_payload(config, &payload);

        match self
            .pos_api
            .create_order(&config.normalized_base_url(), &token, &request)
            .await
        {
            Err(err @ Error::Auth(_)) => {
                // Stale token; drop it so the retry re-authenticates.
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

    async fn process_entry(&self, entry: &OrderQueueEntry) -> Result<Disposition> {
        // Idempotency probe: an order already accepted by the POS is never
        // pushed twice, whichever queue entry carries it.
        if let Some(existing) = self
            .sync_records
            .find_success_by_order_number(&entry.order_number)?
        {
            info!(
                "Order {} already synced as POS order {:?}; completing entry {} without a push",
                entry.order_number, existing.external_order_id, entry.id
            );
            self.queue.mark_completed(&entry.id).await?;
            return Ok(Disposition::Completed);
        }

        self.sync_records
            .mark_attempt(&entry.order_id, &entry.order_number)
            .await?;

        let outcome = match self.resolve_configuration(entry) {
            Ok(config) => self.push_entry(entry, &config).await,
            Err(err) => Err(err),
        };

        match outcome {
            Ok(response) => {
                self.sync_records
                    .mark_success(
                        &entry.order_id,
                        &response.order_id,
                        response.ticket_number.as_deref(),
                    )
                    .await?;
                self.queue.mark_completed(&entry.id).await?;
                info!(
                    "Order {} delivered to the POS as {} (entry {})",
                    entry.order_number, response.order_id, entry.id
                );
                Ok(Disposition::Completed)
            }
            Err(err) => self.handle_failure(entry, err).await,
        }
    }

    async fn handle_failure(&self, entry: &OrderQueueEntry, err: Error) -> Result<Disposition> {
        let error_code = classify(&err);
        let message = err.to_string();
        self.sync_records
            .mark_failure(&entry.order_id, Some(error_code), &message)
            .await?;

        let attempt = entry.retry_count + 1;
        if attempt >= entry.max_retries {
            let exhausted = Error::Capacity(CapacityError::RetriesExhausted {
                order_number: entry.order_number.clone(),
                max_retries: entry.max_retries,
                last_error: message.clone(),
            });
            error!("{} (entry {})", exhausted, entry.id);
            self.queue.mark_failed(&entry.id, attempt, &message).await?;
            Ok(Disposition::Failed)
        } else {
            let not_before = Utc::now() + retry_backoff(attempt);
            warn!(
                "Order {} push failed ({}); retry {}/{} not before {} (entry {})",
                entry.order_number, message, attempt, entry.max_retries, not_before, entry.id
            );
            self.queue
                .mark_retry(&entry.id, attempt, &message, not_before)
                .await?;
            Ok(Disposition::Retried)
        }
    }
}

#[async_trait]
impl OrderSyncServiceTrait for OrderSyncService {
    async fn enqueue_order(&self, new_entry: NewOrderQueueEntry) -> Result<OrderQueueEntry> {
        let entry = self.queue.enqueue(new_entry).await?;
        debug!(
            "Enqueued order {} as entry {} (priority {})",
            entry.order_number, entry.id, entry.priority
        );
        Ok(entry)
    }

    async fn run_once(&self, batch_limit: i64) -> Result<OrderSyncRunSummary> {
        let entries = self.queue.claim_batch(batch_limit).await?;
        let mut summary = OrderSyncRunSummary {
            claimed: entries.len() as u32,
            ..Default::default()
        };
        if entries.is_empty() {
            return Ok(summary);
        }
        debug!("Claimed {} queue entries", entries.len());

        for entry in entries {
            match self.process_entry(&entry).await {
                Ok(Disposition::Completed) => summary.completed += 1,
                Ok(Disposition::Retried) => summary.retried += 1,
                Ok(Disposition::Failed) => summary.failed += 1,
                Err(err) => {
                    // Bookkeeping failed mid-flight; the entry stays in
                    // processing for an operator to requeue.
                    summary.errors += 1;
                    error!(
                        "Entry {} (order {}) left in processing after a bookkeeping failure: {}",
                        entry.id, entry.order_number, err
                    );
                }
            }
        }

        info!(
            "Order sync pass: {} claimed, {} completed, {} retried, {} failed",
            summary.claimed, summary.completed, summary.retried, summary.failed
        );
        Ok(summary)
    }
}

/// Short error class stored with failed attempts; admin listings filter on it.
fn classify(err: &Error) -> &'static str {
    match err {
        Error::Auth(_) => "auth",
        Error::Network(_) => "network",
        Error::Validation(_) => "validation",
        Error::Configuration(_) => "configuration",
        Error::Database(_) => "database",
        Error::Capacity(_) => "capacity",
        Error::Unexpected(_) => "internal",
    }
}

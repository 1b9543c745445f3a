//! Repositories for the durable order queue and per-order sync records.
//!
//! Every status transition runs inside the write actor, so a claim and its
//! compare-and-set flip are one transaction and concurrent claimers cannot
//! receive the same entry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use posbridge_core::errors::{DatabaseError, Result};
use posbridge_core::orders::{
    NewOrderQueueEntry, OrderQueueEntry, OrderQueueRepositoryTrait, OrderSyncRecord,
    OrderSyncRecordRepositoryTrait, OrderSyncStatus, QueueEntryStatus,
};

use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{order_queue, order_sync_records};

use super::model::{OrderQueueEntryDB, OrderSyncRecordDB};

pub struct OrderQueueRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl OrderQueueRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl OrderQueueRepositoryTrait for OrderQueueRepository {
    async fn enqueue(&self, new_entry: NewOrderQueueEntry) -> Result<OrderQueueEntry> {
        new_entry.validate()?;

        self.writer
            .exec(move |conn| {
                let db_entry = OrderQueueEntryDB::from_new(new_entry)?;

                diesel::insert_into(order_queue::table)
                    .values(&db_entry)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(db_entry.into())
            })
            .await
    }

    async fn claim_batch(&self, limit: i64) -> Result<Vec<OrderQueueEntry>> {
        self.writer
            .exec(move |conn| {
                let now_str = Utc::now().to_rfc3339();

                let eligible = order_queue::table
                    .filter(order_queue::status.eq(QueueEntryStatus::Pending.as_str()))
                    .filter(
                        order_queue::not_before
                            .is_null()
                            .or(order_queue::not_before.le(now_str.clone())),
                    )
                    .order((order_queue::priority.desc(), order_queue::created_at.asc()))
                    .limit(limit)
                    .select(order_queue::id)
                    .load::<String>(conn)
                    .map_err(StorageError::from)?;

                if eligible.is_empty() {
                    return Ok(Vec::new());
                }

                // The status guard makes the flip a compare-and-set: a row
                // another claimer has already flipped is left alone.
                diesel::update(
                    order_queue::table
                        .filter(order_queue::id.eq_any(&eligible))
                        .filter(order_queue::status.eq(QueueEntryStatus::Pending.as_str())),
                )
                .set((
                    order_queue::status.eq(QueueEntryStatus::Processing.as_str()),
                    order_queue::processed_at.eq(Some(now_str)),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;

                let claimed = order_queue::table
                    .filter(order_queue::id.eq_any(&eligible))
                    .filter(order_queue::status.eq(QueueEntryStatus::Processing.as_str()))
                    .order((order_queue::priority.desc(), order_queue::created_at.asc()))
                    .load::<OrderQueueEntryDB>(conn)
                    .map_err(StorageError::from)?;

                Ok(claimed.into_iter().map(Into::into).collect())
            })
            .await
    }

    async fn mark_completed(&self, entry_id: &str) -> Result<OrderQueueEntry> {
        let entry_id = entry_id.to_string();

        self.writer
            .exec(move |conn| {
                let updated = diesel::update(
                    order_queue::table
                        .find(&entry_id)
                        .filter(order_queue::status.eq(QueueEntryStatus::Processing.as_str())),
                )
                .set((
                    order_queue::status.eq(QueueEntryStatus::Completed.as_str()),
                    order_queue::completed_at.eq(Some(Utc::now().to_rfc3339())),
                    order_queue::error_message.eq(None::<String>),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;

                if updated == 0 {
                    return Err(DatabaseError::NotFound(format!(
                        "Queue entry {} is not in processing state",
                        entry_id
                    ))
                    .into());
                }

                let row = order_queue::table
                    .find(&entry_id)
                    .first::<OrderQueueEntryDB>(conn)
                    .map_err(StorageError::from)?;

                Ok(row.into())
            })
            .await
    }

    async fn mark_retry(
        &self,
        entry_id: &str,
        retry_count: i32,
        error_message: &str,
        not_before: DateTime<Utc>,
    ) -> Result<OrderQueueEntry> {
        let entry_id = entry_id.to_string();
        let error_message = error_message.to_string();

        self.writer
            .exec(move |conn| {
                let updated = diesel::update(
                    order_queue::table
                        .find(&entry_id)
                        .filter(order_queue::status.eq(QueueEntryStatus::Processing.as_str())),
                )
                .set((
                    order_queue::status.eq(QueueEntryStatus::Pending.as_str()),
                    order_queue::retry_count.eq(retry_count),
                    order_queue::error_message.eq(Some(error_message)),
                    order_queue::not_before.eq(Some(not_before.to_rfc3339())),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;

                if updated == 0 {
                    return Err(DatabaseError::NotFound(format!(
                        "Queue entry {} is not in processing state",
                        entry_id
                    ))
                    .into());
                }

                let row = order_queue::table
                    .find(&entry_id)
                    .first::<OrderQueueEntryDB>(conn)
                    .map_err(StorageError::from)?;

                Ok(row.into())
            })
            .await
    }

    async fn mark_failed(
        &self,
        entry_id: &str,
        retry_count: i32,
        error_message: &str,
    ) -> Result<OrderQueueEntry> {
        let entry_id = entry_id.to_string();
        let error_message = error_message.to_string();

        self.writer
            .exec(move |conn| {
                let updated = diesel::update(
                    order_queue::table
                        .find(&entry_id)
                        .filter(order_queue::status.eq(QueueEntryStatus::Processing.as_str())),
                )
                .set((
                    order_queue::status.eq(QueueEntryStatus::Failed.as_str()),
                    order_queue::retry_count.eq(retry_count),
                    order_queue::error_message.eq(Some(error_message)),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;

                if updated == 0 {
                    return Err(DatabaseError::NotFound(format!(
                        "Queue entry {} is not in processing state",
                        entry_id
                    ))
                    .into());
                }

                let row = order_queue::table
                    .find(&entry_id)
                    .first::<OrderQueueEntryDB>(conn)
                    .map_err(StorageError::from)?;

                Ok(row.into())
            })
            .await
    }

    fn get_by_id(&self, entry_id: &str) -> Result<OrderQueueEntry> {
        let mut conn = get_connection(&self.pool)?;

        let row = order_queue::table
            .find(entry_id)
            .first::<OrderQueueEntryDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(row.into())
    }

    fn list(
        &self,
        status_filter: Option<QueueEntryStatus>,
        limit: i64,
    ) -> Result<Vec<OrderQueueEntry>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = order_queue::table.into_boxed();

        if let Some(status) = status_filter {
            query = query.filter(order_queue::status.eq(status.as_str()));
        }

        let rows = query
            .order(order_queue::created_at.desc())
            .limit(limit)
            .load::<OrderQueueEntryDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn count_by_status(&self, status: QueueEntryStatus) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;

        let count = order_queue::table
            .filter(order_queue::status.eq(status.as_str()))
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(count)
    }
}

pub struct OrderSyncRecordRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl OrderSyncRecordRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl OrderSyncRecordRepositoryTrait for OrderSyncRecordRepository {
    async fn mark_attempt(&self, order_id: &str, order_number: &str) -> Result<OrderSyncRecord> {
        let order_id = order_id.to_string();
        let order_number = order_number.to_string();

        self.writer
            .exec(move |conn| {
                let now_str = Utc::now().to_rfc3339();

                let existing = order_sync_records::table
                    .find(&order_id)
                    .first::<OrderSyncRecordDB>(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                match existing {
                    Some(_) => {
                        diesel::update(order_sync_records::table.find(&order_id))
                            .set((
                                order_sync_records::sync_status
                                    .eq(OrderSyncStatus::Syncing.as_str()),
                                order_sync_records::attempts
                                    .eq(order_sync_records::attempts + 1),
                                order_sync_records::updated_at.eq(&now_str),
                            ))
                            .execute(conn)
                            .map_err(StorageError::from)?;
                    }
                    None => {
                        let new_record = OrderSyncRecordDB {
                            order_id: order_id.clone(),
                            order_number,
                            external_order_id: None,
                            external_ticket_number: None,
                            sync_status: OrderSyncStatus::Syncing.as_str().to_string(),
                            attempts: 1,
                            error_code: None,
                            error_message: None,
                            last_synced_at: None,
                            created_at: now_str.clone(),
                            updated_at: now_str.clone(),
                        };

                        diesel::insert_into(order_sync_records::table)
                            .values(&new_record)
                            .execute(conn)
                            .map_err(StorageError::from)?;
                    }
                }

                let row = order_sync_records::table
                    .find(&order_id)
                    .first::<OrderSyncRecordDB>(conn)
                    .map_err(StorageError::from)?;

                Ok(row.into())
            })
            .await
    }

    async fn mark_success(
        &self,
        order_id: &str,
        external_order_id: &str,
        external_ticket_number: Option<&str>,
    ) -> Result<OrderSyncRecord> {
        let order_id = order_id.to_string();
        let external_order_id = external_order_id.to_string();
        let external_ticket_number = external_ticket_number.map(str::to_string);

        self.writer
            .exec(move |conn| {
                let now_str = Utc::now().to_rfc3339();

                let updated = diesel::update(order_sync_records::table.find(&order_id))
                    .set((
                        order_sync_records::sync_status.eq(OrderSyncStatus::Success.as_str()),
                        order_sync_records::external_order_id.eq(Some(external_order_id)),
                        order_sync_records::external_ticket_number.eq(external_ticket_number),
                        order_sync_records::error_code.eq(None::<String>),
                        order_sync_records::error_message.eq(None::<String>),
                        order_sync_records::last_synced_at.eq(Some(now_str.clone())),
                        order_sync_records::updated_at.eq(&now_str),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                if updated == 0 {
                    return Err(DatabaseError::NotFound(format!(
                        "Order sync record {} not found",
                        order_id
                    ))
                    .into());
                }

                let row = order_sync_records::table
                    .find(&order_id)
                    .first::<OrderSyncRecordDB>(conn)
                    .map_err(StorageError::from)?;

                Ok(row.into())
            })
            .await
    }

    async fn mark_failure(
        &self,
        order_id: &str,
        error_code: Option<&str>,
        error_message: &str,
    ) -> Result<OrderSyncRecord> {
        let order_id = order_id.to_string();
        let error_code = error_code.map(str::to_string);
        let error_message = error_message.to_string();

        self.writer
            .exec(move |conn| {
                let now_str = Utc::now().to_rfc3339();

                let updated = diesel::update(order_sync_records::table.find(&order_id))
                    .set((
                        order_sync_records::sync_status.eq(OrderSyncStatus::Failed.as_str()),
                        order_sync_records::error_code.eq(error_code),
                        order_sync_records::error_message.eq(Some(error_message)),
                        order_sync_records::updated_at.eq(&now_str),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                if updated == 0 {
                    return Err(DatabaseError::NotFound(format!(
                        "Order sync record {} not found",
                        order_id
                    ))
                    .into());
                }

                let row = order_sync_records::table
                    .find(&order_id)
                    .first::<OrderSyncRecordDB>(conn)
                    .map_err(StorageError::from)?;

                Ok(row.into())
            })
            .await
    }

    fn get_by_order_id(&self, order_id: &str) -> Result<Option<OrderSyncRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let row = order_sync_records::table
            .find(order_id)
            .first::<OrderSyncRecordDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(row.map(Into::into))
    }

    fn find_success_by_order_number(&self, order_number: &str) -> Result<Option<OrderSyncRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let row = order_sync_records::table
            .filter(order_sync_records::order_number.eq(order_number))
            .filter(order_sync_records::sync_status.eq(OrderSyncStatus::Success.as_str()))
            .order(order_sync_records::updated_at.desc())
            .first::<OrderSyncRecordDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        Ok(row.map(Into::into))
    }

    fn list_recent(&self, limit: i64) -> Result<Vec<OrderSyncRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = order_sync_records::table
            .order(order_sync_records::updated_at.desc())
            .limit(limit)
            .load::<OrderSyncRecordDB>(&mut conn)
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

//! Integration tests for per-order sync records.

mod common;

use posbridge_core::orders::{OrderSyncRecordRepositoryTrait, OrderSyncStatus};
use posbridge_storage_sqlite::orders::OrderSyncRecordRepository;

#[tokio::test]
async fn test_attempt_creates_then_increments() {
    let (_dir, pool, writer) = common::setup_db();
    let repo = OrderSyncRecordRepository::new(pool, writer);

    let first = repo.mark_attempt("o1", "N-1").await.unwrap();
    assert_eq!(first.attempts, 1);
    assert_eq!(first.sync_status, OrderSyncStatus::Syncing);
    assert!(first.external_order_id.is_none());

    let second = repo.mark_attempt("o1", "N-1").await.unwrap();
    assert_eq!(second.attempts, 2);

    // One logical record per order id.
    assert_eq!(repo.list_recent(10).unwrap().len(), 1);
}

#[tokio::test]
async fn test_success_records_external_identifiers() {
    let (_dir, pool, writer) = common::setup_db();
    let repo = OrderSyncRecordRepository::new(pool, writer);

    repo.mark_attempt("o1", "N-1").await.unwrap();
    let record = repo
        .mark_success("o1", "pos-order-9", Some("T-42"))
        .await
        .unwrap();

    assert_eq!(record.sync_status, OrderSyncStatus::Success);
    assert_eq!(record.external_order_id.as_deref(), Some("pos-order-9"));
    assert_eq!(record.external_ticket_number.as_deref(), Some("T-42"));
    assert!(record.last_synced_at.is_some());
    assert!(record.error_message.is_none());
}

#[tokio::test]
async fn test_failure_keeps_attempt_count_and_sets_error() {
    let (_dir, pool, writer) = common::setup_db();
    let repo = OrderSyncRecordRepository::new(pool, writer);

    repo.mark_attempt("o1", "N-1").await.unwrap();
    repo.mark_attempt("o1", "N-1").await.unwrap();
    let record = repo
        .mark_failure("o1", Some("network"), "connect timeout")
        .await
        .unwrap();

    assert_eq!(record.sync_status, OrderSyncStatus::Failed);
    assert_eq!(record.attempts, 2);
    assert_eq!(record.error_code.as_deref(), Some("network"));
    assert_eq!(record.error_message.as_deref(), Some("connect timeout"));
    assert!(record.last_synced_at.is_none());
}

#[tokio::test]
async fn test_success_probe_ignores_failed_records() {
    let (_dir, pool, writer) = common::setup_db();
    let repo = OrderSyncRecordRepository::new(pool, writer);

    repo.mark_attempt("o1", "N-1").await.unwrap();
    repo.mark_failure("o1", None, "boom").await.unwrap();
    assert!(repo.find_success_by_order_number("N-1").unwrap().is_none());

    repo.mark_attempt("o2", "N-2").await.unwrap();
    repo.mark_success("o2", "ext-2", None).await.unwrap();

    let probe = repo.find_success_by_order_number("N-2").unwrap();
    assert_eq!(probe.unwrap().order_id, "o2");
}

#[tokio::test]
async fn test_success_without_attempt_is_an_error() {
    let (_dir, pool, writer) = common::setup_db();
    let repo = OrderSyncRecordRepository::new(pool, writer);

    assert!(repo.mark_success("ghost", "ext", None).await.is_err());
    assert!(repo.get_by_order_id("ghost").unwrap().is_none());
}

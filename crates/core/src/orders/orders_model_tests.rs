//! Tests for order queue models, payload versioning, and retry backoff.

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{Duration, Utc};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use crate::constants::{ORDER_PAYLOAD_VERSION, RETRY_BACKOFF_MAX_SECS};
    use crate::orders::{
        retry_backoff, NewOrderQueueEntry, OrderLine, OrderPayload, OrderQueueEntry,
        OrderSyncStatus, QueueEntryStatus,
    };

    fn sample_payload() -> OrderPayload {
        OrderPayload {
            schema_version: ORDER_PAYLOAD_VERSION,
            order_id: "ord-1".to_string(),
            order_number: "1001".to_string(),
            store_id: Some("store-1".to_string()),
            customer: None,
            items: vec![OrderLine {
                external_product_id: "ext-55".to_string(),
                name: "Espresso".to_string(),
                quantity: dec!(2),
                unit_price: dec!(3.50),
            }],
            comment: None,
            total: dec!(7.00),
            placed_at: Utc::now(),
        }
    }

    fn entry_with_payload(payload: &str) -> OrderQueueEntry {
        OrderQueueEntry {
            id: "q-1".to_string(),
            order_id: "ord-1".to_string(),
            order_number: "1001".to_string(),
            store_id: Some("store-1".to_string()),
            payload: payload.to_string(),
            status: QueueEntryStatus::Pending,
            priority: 0,
            retry_count: 0,
            max_retries: 3,
            not_before: None,
            error_message: None,
            created_at: Utc::now(),
            processed_at: None,
            completed_at: None,
        }
    }

    // ==================== Status Tests ====================

    #[test]
    fn test_queue_status_round_trip() {
        for status in [
            QueueEntryStatus::Pending,
            QueueEntryStatus::Processing,
            QueueEntryStatus::Completed,
            QueueEntryStatus::Failed,
        ] {
            assert_eq!(
                QueueEntryStatus::from_str(status.as_str()).unwrap(),
                status
            );
        }
        assert!(QueueEntryStatus::from_str("bogus").is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(QueueEntryStatus::Completed.is_terminal());
        assert!(QueueEntryStatus::Failed.is_terminal());
        assert!(!QueueEntryStatus::Pending.is_terminal());
        assert!(!QueueEntryStatus::Processing.is_terminal());
    }

    #[test]
    fn test_sync_status_round_trip() {
        assert_eq!(
            OrderSyncStatus::from_str("success").unwrap(),
            OrderSyncStatus::Success
        );
        assert_eq!(OrderSyncStatus::Syncing.as_str(), "syncing");
    }

    // ==================== Payload Tests ====================

    #[test]
    fn test_payload_round_trip() {
        let payload = sample_payload();
        let json = serde_json::to_string(&payload).unwrap();
        let entry = entry_with_payload(&json);
        let parsed = entry.parse_payload().unwrap();
        assert_eq!(parsed.order_number, "1001");
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.total, dec!(7.00));
    }

    #[test]
    fn test_payload_rejects_unknown_version() {
        let mut payload = sample_payload();
        payload.schema_version = 99;
        let json = serde_json::to_string(&payload).unwrap();
        let entry = entry_with_payload(&json);
        assert!(entry.parse_payload().is_err());
    }

    #[test]
    fn test_payload_rejects_garbage() {
        let entry = entry_with_payload("not json at all");
        assert!(entry.parse_payload().is_err());
    }

    #[test]
    fn test_new_entry_validation() {
        let valid = NewOrderQueueEntry {
            order_id: "ord-1".to_string(),
            order_number: "1001".to_string(),
            store_id: None,
            payload: sample_payload(),
            priority: 0,
            max_retries: 3,
        };
        assert!(valid.validate().is_ok());

        let mut no_items = valid.clone();
        no_items.payload.items.clear();
        assert!(no_items.validate().is_err());

        let mut blank_number = valid.clone();
        blank_number.order_number = " ".to_string();
        assert!(blank_number.validate().is_err());

        let mut zero_budget = valid;
        zero_budget.max_retries = 0;
        assert!(zero_budget.validate().is_err());
    }

    // ==================== Backoff Tests ====================

    #[test]
    fn test_backoff_doubles_then_caps() {
        assert_eq!(retry_backoff(1), Duration::seconds(5));
        assert_eq!(retry_backoff(2), Duration::seconds(10));
        assert_eq!(retry_backoff(3), Duration::seconds(20));
        assert_eq!(retry_backoff(7), Duration::seconds(300));
        assert_eq!(retry_backoff(50), Duration::seconds(300));
    }

    #[test]
    fn test_backoff_handles_degenerate_input() {
        assert_eq!(retry_backoff(0), Duration::seconds(5));
        assert_eq!(retry_backoff(-3), Duration::seconds(5));
    }

    proptest! {
        #[test]
        fn prop_backoff_bounded_and_monotonic(n in 1i32..100) {
            let current = retry_backoff(n);
            let next = retry_backoff(n + 1);
            prop_assert!(current.num_seconds() >= 5);
            prop_assert!(current.num_seconds() <= RETRY_BACKOFF_MAX_SECS);
            prop_assert!(next >= current);
        }
    }
}

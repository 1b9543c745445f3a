/// Safety margin before token expiry; a cached token this close to expiring
/// is refreshed instead of reused.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Assumed token lifetime when the POS omits `expires_at` from its auth
/// response.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Default retry budget for an order queue entry.
pub const DEFAULT_MAX_RETRIES: i32 = 3;

/// Default priority assigned to queue entries at enqueue time.
pub const DEFAULT_QUEUE_PRIORITY: i32 = 0;

/// Base delay before the first retry of a failed queue entry.
pub const RETRY_BACKOFF_BASE_SECS: i64 = 5;

/// Ceiling for the exponential retry backoff.
pub const RETRY_BACKOFF_MAX_SECS: i64 = 300;

/// External id of the sentinel menu sync record that summarizes a run.
pub const MENU_SYNC_RUN_MARKER: &str = "__menu_sync_run__";

/// Schema version written into serialized order payloads.
pub const ORDER_PAYLOAD_VERSION: u32 = 1;

/// Default stock quantity for products created by menu sync.
pub const DEFAULT_PRODUCT_STOCK: i32 = 0;

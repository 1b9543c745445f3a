//! Environment-driven server configuration.

use tracing::warn;

const DEFAULT_DB_PATH: &str = "./data/posbridge.db";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8293";
const DEFAULT_ORDER_SYNC_INTERVAL_SECS: u64 = 30;
const DEFAULT_MENU_SYNC_INTERVAL_MINS: u64 = 30;
const DEFAULT_ORDER_BATCH_SIZE: i64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub listen_addr: String,
    /// Bearer token guarding the admin API. When unset, admin routes answer
    /// 503 until one is configured.
    pub admin_token: Option<String>,
    pub order_sync_interval_secs: u64,
    pub menu_sync_interval_mins: u64,
    pub order_batch_size: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            db_path: env_or("PB_DB_PATH", DEFAULT_DB_PATH),
            listen_addr: env_or("PB_LISTEN_ADDR", DEFAULT_LISTEN_ADDR),
            admin_token: std::env::var("PB_ADMIN_TOKEN")
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            order_sync_interval_secs: env_parsed(
                "PB_ORDER_SYNC_INTERVAL_SECS",
                DEFAULT_ORDER_SYNC_INTERVAL_SECS,
            ),
            menu_sync_interval_mins: env_parsed(
                "PB_MENU_SYNC_INTERVAL_MINS",
                DEFAULT_MENU_SYNC_INTERVAL_MINS,
            ),
            order_batch_size: env_parsed("PB_ORDER_BATCH_SIZE", DEFAULT_ORDER_BATCH_SIZE),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}={:?}; using the default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

//! Bearer token lifecycle for POS configurations.
//!
//! Tokens are cached on the configuration row and reused until they come
//! within the expiry margin. A per-configuration mutex collapses concurrent
//! refreshes into a single POS round trip; waiters pick up the freshly
//! stored token instead of issuing their own request.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use log::{debug, info};
use tokio::sync::Mutex;

use posbridge_core::configurations::ConfigurationRepositoryTrait;
use posbridge_core::constants::DEFAULT_TOKEN_TTL_SECS;
use posbridge_core::errors::{ConfigurationError, Result};

use crate::client::PosApi;

/// Hands out usable bearer tokens and owns the cached-token columns.
pub struct TokenManager {
    configurations: Arc<dyn ConfigurationRepositoryTrait>,
    pos_api: Arc<dyn PosApi>,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TokenManager {
    pub fn new(
        configurations: Arc<dyn ConfigurationRepositoryTrait>,
        pos_api: Arc<dyn PosApi>,
    ) -> Self {
        Self {
            configurations,
            pos_api,
            refresh_locks: DashMap::new(),
        }
    }

    /// Returns a token for the configuration, refreshing it against the POS
    /// when the cached one is absent or about to expire.
    ///
    /// Auth failures propagate to every caller; there is no retry here. The
    /// queue worker's backoff owns that policy.
    pub async fn get_token(&self, config_id: &str) -> Result<String> {
        let config = self.configurations.get_by_id(config_id)?;
        if !config.is_active {
            return Err(ConfigurationError::Inactive(config_id.to_string()).into());
        }
        if let Some(token) = config.usable_token() {
            return Ok(token.to_string());
        }

        let lock = self
            .refresh_locks
            .entry(config_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-read after the wait: the previous lock holder may have stored
        // a fresh token already.
        let config = self.configurations.get_by_id(config_id)?;
        if let Some(token) = config.usable_token() {
            debug!(
                "Reusing the token a concurrent caller refreshed for configuration {}",
                config_id
            );
            return Ok(token.to_string());
        }

        let auth = self
            .pos_api
            .authenticate(&config.normalized_base_url(), &config.login)
            .await?;
        let expires_at = auth
            .expires_at
            .unwrap_or_else(|| Utc::now() + Duration::seconds(DEFAULT_TOKEN_TTL_SECS));
        self.configurations
            .store_token(&config.id, &auth.token, expires_at)
            .await?;
        info!("Refreshed POS token for configuration {}", config_id);
        Ok(auth.token)
    }

    /// Drops the cached token so the next caller performs a fresh exchange.
    /// Called when the POS answers a data request with 401.
    pub async fn invalidate(&self, config_id: &str) -> Result<()> {
        info!(
            "Invalidating cached POS token for configuration {}",
            config_id
        );
        self.configurations.clear_token(config_id).await
    }
}

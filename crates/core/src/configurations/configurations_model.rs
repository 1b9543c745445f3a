//! POS configuration domain models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::TOKEN_EXPIRY_MARGIN_SECS;
use crate::errors::{Result, ValidationError};

/// One POS integration profile.
///
/// Several rows may exist for the same store (history, testing); store
/// lookups resolve the most recently updated row with `is_active = true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosConfiguration {
    pub id: String,
    pub name: String,
    pub store_id: Option<String>,
    pub base_url: String,
    pub login: String,
    pub organization_id: String,
    pub organization_name: Option<String>,
    pub terminal_group_id: Option<String>,
    pub terminal_group_name: Option<String>,
    pub auto_sync: bool,
    pub sync_interval_minutes: i32,
    pub is_active: bool,
    /// Cached bearer token; managed exclusively by the token manager.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PosConfiguration {
    /// Returns the cached token if it is still usable, i.e. present and not
    /// within the safety margin of its expiry.
    pub fn usable_token(&self) -> Option<&str> {
        let token = self.cached_token.as_deref()?;
        let expires_at = self.token_expires_at?;
        if expires_at - Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) > Utc::now() {
            Some(token)
        } else {
            None
        }
    }

    /// Base URL without a trailing slash, ready for path concatenation.
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }
}

/// Input model for creating a new configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPosConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub store_id: Option<String>,
    pub base_url: String,
    pub login: String,
    pub organization_id: String,
    pub organization_name: Option<String>,
    pub terminal_group_id: Option<String>,
    pub terminal_group_name: Option<String>,
    #[serde(default = "default_auto_sync")]
    pub auto_sync: bool,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_minutes: i32,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_auto_sync() -> bool {
    true
}

fn default_sync_interval() -> i32 {
    30
}

fn default_is_active() -> bool {
    true
}

impl NewPosConfiguration {
    /// Validates the new configuration data.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        validate_base_url(&self.base_url)?;
        validate_login(&self.login)?;
        validate_organization_id(&self.organization_id)?;
        validate_sync_interval(self.sync_interval_minutes)?;
        Ok(())
    }
}

/// Partial update for an existing configuration.
///
/// `None` fields are left untouched; the token cache is not updatable through
/// this path (the token manager owns it).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosConfigurationUpdate {
    pub name: Option<String>,
    pub store_id: Option<Option<String>>,
    pub base_url: Option<String>,
    pub login: Option<String>,
    pub organization_id: Option<String>,
    pub organization_name: Option<Option<String>>,
    pub terminal_group_id: Option<Option<String>>,
    pub terminal_group_name: Option<Option<String>>,
    pub auto_sync: Option<bool>,
    pub sync_interval_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

impl PosConfigurationUpdate {
    /// Validates the fields present in the update.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::MissingField("name".to_string()).into());
            }
        }
        if let Some(base_url) = &self.base_url {
            validate_base_url(base_url)?;
        }
        if let Some(login) = &self.login {
            validate_login(login)?;
        }
        if let Some(organization_id) = &self.organization_id {
            validate_organization_id(organization_id)?;
        }
        if let Some(interval) = self.sync_interval_minutes {
            validate_sync_interval(interval)?;
        }
        Ok(())
    }

    /// True when the update touches credentials, which invalidates any
    /// cached token.
    pub fn changes_credentials(&self) -> bool {
        self.base_url.is_some() || self.login.is_some()
    }
}

fn validate_base_url(base_url: &str) -> Result<()> {
    let parsed =
        Url::parse(base_url).map_err(|_| ValidationError::InvalidUrl(base_url.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ValidationError::InvalidUrl(base_url.to_string()).into()),
    }
}

fn validate_login(login: &str) -> Result<()> {
    if login.trim().is_empty() {
        return Err(ValidationError::MissingField("login".to_string()).into());
    }
    Ok(())
}

fn validate_organization_id(organization_id: &str) -> Result<()> {
    if organization_id.trim().is_empty() {
        return Err(ValidationError::MissingField("organizationId".to_string()).into());
    }
    Ok(())
}

fn validate_sync_interval(minutes: i32) -> Result<()> {
    if minutes < 1 {
        return Err(ValidationError::InvalidInput(format!(
            "syncIntervalMinutes must be at least 1, got {}",
            minutes
        ))
        .into());
    }
    Ok(())
}

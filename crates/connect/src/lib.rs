//! Posbridge Connect - POS-facing sync services.
//!
//! This crate talks to the external point-of-sale API: token management,
//! the outbound order queue worker, and the inbound menu sync. Persistence
//! is injected through the `posbridge-core` repository traits.

pub mod auth;
pub mod client;
pub mod menu;
pub mod models;
pub mod orders;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use auth::TokenManager;
pub use client::{PosApi, PosApiClient};
pub use menu::{MenuSyncService, MenuSyncServiceTrait};
pub use orders::{OrderSyncService, OrderSyncServiceTrait};

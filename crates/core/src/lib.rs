//! Posbridge Core - Domain entities, services, and traits.
//!
//! This crate contains the core business logic for the POS synchronization
//! engine. It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate (persistence) and the `connect` crate
//! (POS-facing sync services).

pub mod configurations;
pub mod constants;
pub mod errors;
pub mod mappings;
pub mod menu;
pub mod orders;
pub mod products;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

//! SQLite storage implementation for the POS bridge.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `posbridge-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for all persisted entities
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! All other crates (`core`, `connect`) are database-agnostic and work with traits.
//!
//! ```text
//! core (domain)          connect (POS sync)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```
//!
//! Reads go straight to the pool; every mutation is funneled through the
//! write actor in [`db::write_actor`] so SQLite sees a single writer.

pub mod db;
pub mod errors;
pub mod schema;
mod utils;

// Repository implementations
pub mod configurations;
pub mod mappings;
pub mod menu;
pub mod orders;
pub mod products;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from posbridge-core for convenience
pub use posbridge_core::errors::{DatabaseError, Error, Result};

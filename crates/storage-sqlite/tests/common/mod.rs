use std::sync::Arc;

use posbridge_storage_sqlite::db::{self, DbPool, WriteHandle};
use tempfile::TempDir;

/// Spins up a fresh migrated database in a temp directory.
///
/// The TempDir must stay alive for the duration of the test; dropping it
/// deletes the database file.
pub fn setup_db() -> (TempDir, Arc<DbPool>, WriteHandle) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = dir
        .path()
        .join("posbridge.db")
        .to_str()
        .expect("temp path is not valid utf-8")
        .to_string();

    db::init(&db_path).expect("failed to initialize database");
    let pool = db::create_pool(&db_path).expect("failed to create pool");
    db::run_migrations(&pool).expect("failed to run migrations");
    let writer = db::spawn_writer(pool.as_ref().clone());

    (dir, pool, writer)
}

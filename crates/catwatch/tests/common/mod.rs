//! Shared fixtures for integration tests.

#![allow(dead_code)]

use catwatch::Database;
use tempfile::NamedTempFile;

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and the database.
pub fn setup_test_db() -> (NamedTempFile, Database) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let database = Database::new(db_path);
    database.run_migrations().expect("Migrations failed");
    (db_file, database)
}

//! SQLite connection factory and schema migrations.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{DbError, DbErrorKind};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Handle to the SQLite database backing every repository.
///
/// Each repository call opens its own connection, so the handle is cheap to
/// clone and share across request handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    db_url: String,
}

impl Database {
    /// Creates a handle for the database file at `db_url`.
    ///
    /// Nothing is opened until the first connection is requested.
    #[instrument(skip(db_url))]
    pub fn new(db_url: impl Into<String>) -> Self {
        let db_url = db_url.into();
        info!(url = %db_url, "Creating database handle");
        Self { db_url }
    }

    /// Returns the database location.
    pub fn url(&self) -> &str {
        &self.db_url
    }

    /// Establishes a database connection.
    ///
    /// # Errors
    ///
    /// Returns a [`DbError`] of kind `StorageUnavailable` if the file cannot
    /// be opened.
    #[instrument(skip(self))]
    pub(crate) fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(url = %self.db_url, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_url).map_err(|e| {
            DbError::unavailable(format!("Failed to connect to '{}': {}", self.db_url, e))
        })?;
        conn.batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))
            .map_err(|e| DbError::unavailable(format!("Failed to configure connection: {}", e)))?;
        Ok(conn)
    }

    /// Applies every pending schema migration and returns how many ran.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database is unreachable or a migration fails.
    #[instrument(skip(self), fields(url = %self.db_url))]
    pub fn run_migrations(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbErrorKind::Query, format!("Migrations failed: {}", e)))?;

        info!(count = applied.len(), "Migrations applied");
        Ok(applied.len())
    }
}

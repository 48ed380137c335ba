//! Statistics snapshot store and queries.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::statistics::StatisticsRow;
use crate::db::{Database, DbError, Statistics, schema, truncate_to_millis};

/// Converts a caller-supplied row limit into a SQL `LIMIT` value.
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Store for organization statistics snapshots.
///
/// Records are identified by `(organization id, snapshot date)`. Queries
/// returning snapshots newest first break timestamp ties by ascending
/// organization id.
#[derive(Debug, Clone)]
pub struct StatisticsRepository {
    database: Database,
}

impl StatisticsRepository {
    /// Creates a repository backed by `database`.
    #[instrument(skip(database), fields(url = %database.url()))]
    pub fn new(database: Database) -> Self {
        info!("Creating StatisticsRepository");
        Self { database }
    }

    /// Inserts the snapshot, or replaces the stored one with the same key.
    ///
    /// Returns the snapshot as re-read from the store.
    ///
    /// # Errors
    ///
    /// Returns a validation [`DbError`] if the key is incomplete, otherwise
    /// any storage failure.
    #[instrument(skip(self, statistics), fields(organization_id = statistics.id(), snapshot_date = ?statistics.snapshot_date()))]
    pub fn save(&self, statistics: &Statistics) -> Result<Statistics, DbError> {
        let row = StatisticsRow::try_from(statistics)?;
        debug!("Saving statistics snapshot");
        let mut conn = self.database.connection()?;

        let saved = conn.transaction::<_, DbError, _>(|conn| {
            diesel::replace_into(schema::statistics::table)
                .values(&row)
                .execute(conn)?;

            let saved = schema::statistics::table
                .find((row.organization_id, row.snapshot_date))
                .select(StatisticsRow::as_select())
                .first(conn)?;
            Ok(saved)
        })?;

        info!(organization_id = saved.organization_id, "Statistics snapshot saved");
        Ok(saved.into())
    }

    /// Saves every snapshot in order, each in its own transaction.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first failure.
    #[instrument(skip(self, statistics), fields(count = statistics.len()))]
    pub fn save_all(&self, statistics: &[Statistics]) -> Result<Vec<Statistics>, DbError> {
        statistics.iter().map(|s| self.save(s)).collect()
    }

    /// Removes every snapshot and returns how many were deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_all(&self) -> Result<usize, DbError> {
        let mut conn = self.database.connection()?;
        let deleted = diesel::delete(schema::statistics::table).execute(&mut conn)?;
        info!(deleted, "Statistics deleted");
        Ok(deleted)
    }

    /// Lists every snapshot, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_all(&self) -> Result<Vec<Statistics>, DbError> {
        let mut conn = self.database.connection()?;

        let rows = schema::statistics::table
            .order((
                schema::statistics::organization_id.asc(),
                schema::statistics::snapshot_date.asc(),
            ))
            .select(StatisticsRow::as_select())
            .load(&mut conn)?;

        debug!(count = rows.len(), "Statistics loaded");
        Ok(rows.into_iter().map(Statistics::from).collect())
    }

    /// Lists every snapshot whose organization name equals `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_by_organization_name(&self, name: &str) -> Result<Vec<Statistics>, DbError> {
        let mut conn = self.database.connection()?;

        let rows = schema::statistics::table
            .filter(schema::statistics::organization_name.eq(name))
            .order((
                schema::statistics::snapshot_date.asc(),
                schema::statistics::organization_id.asc(),
            ))
            .select(StatisticsRow::as_select())
            .load(&mut conn)?;

        debug!(organization = %name, count = rows.len(), "Statistics loaded");
        Ok(rows.into_iter().map(Statistics::from).collect())
    }

    /// Returns up to `limit` snapshots of `name`, most recent first.
    ///
    /// With `limit == 1` this is the latest snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_latest_by_organization_name(
        &self,
        name: &str,
        limit: usize,
    ) -> Result<Vec<Statistics>, DbError> {
        let mut conn = self.database.connection()?;

        let rows = schema::statistics::table
            .filter(schema::statistics::organization_name.eq(name))
            .order((
                schema::statistics::snapshot_date.desc(),
                schema::statistics::organization_id.asc(),
            ))
            .limit(sql_limit(limit))
            .select(StatisticsRow::as_select())
            .load(&mut conn)?;

        debug!(organization = %name, count = rows.len(), "Latest statistics loaded");
        Ok(rows.into_iter().map(Statistics::from).collect())
    }

    /// Returns the snapshots of `name` taken between `start` and `end`,
    /// both inclusive, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_in_period(
        &self,
        name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Statistics>, DbError> {
        let start = truncate_to_millis(start).naive_utc();
        let end = truncate_to_millis(end).naive_utc();
        let mut conn = self.database.connection()?;

        let rows = schema::statistics::table
            .filter(schema::statistics::organization_name.eq(name))
            .filter(schema::statistics::snapshot_date.ge(start))
            .filter(schema::statistics::snapshot_date.le(end))
            .order((
                schema::statistics::snapshot_date.desc(),
                schema::statistics::organization_id.asc(),
            ))
            .select(StatisticsRow::as_select())
            .load(&mut conn)?;

        debug!(organization = %name, count = rows.len(), "Statistics in period loaded");
        Ok(rows.into_iter().map(Statistics::from).collect())
    }
}

//! Contributor snapshot store.

use chrono::NaiveDateTime;
use diesel::dsl::max;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use super::statistics::sql_limit;
use crate::db::contributor::ContributorRow;
use crate::db::{Contributor, Database, DbError, schema};

/// Store for organization contributors.
#[derive(Debug, Clone)]
pub struct ContributorRepository {
    database: Database,
}

impl ContributorRepository {
    /// Creates a repository backed by `database`.
    #[instrument(skip(database), fields(url = %database.url()))]
    pub fn new(database: Database) -> Self {
        info!("Creating ContributorRepository");
        Self { database }
    }

    /// Inserts the contributor, or replaces the stored one with the same key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, contributor), fields(id = contributor.key().id(), organization_id = contributor.key().organization_id()))]
    pub fn save(&self, contributor: &Contributor) -> Result<Contributor, DbError> {
        let row = ContributorRow::from(contributor);
        let mut conn = self.database.connection()?;

        let saved = conn.transaction::<_, DbError, _>(|conn| {
            diesel::replace_into(schema::contributors::table)
                .values(&row)
                .execute(conn)?;

            let saved = schema::contributors::table
                .find((row.id, row.organization_id, row.snapshot_date))
                .select(ContributorRow::as_select())
                .first(conn)?;
            Ok(saved)
        })?;

        debug!("Contributor saved");
        Ok(saved.into())
    }

    /// Saves every contributor in order.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first failure.
    #[instrument(skip(self, contributors), fields(count = contributors.len()))]
    pub fn save_all(&self, contributors: &[Contributor]) -> Result<Vec<Contributor>, DbError> {
        contributors.iter().map(|c| self.save(c)).collect()
    }

    /// Removes every contributor and returns how many were deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_all(&self) -> Result<usize, DbError> {
        let mut conn = self.database.connection()?;
        let deleted = diesel::delete(schema::contributors::table).execute(&mut conn)?;
        info!(deleted, "Contributors deleted");
        Ok(deleted)
    }

    /// Lists every contributor, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_all(&self) -> Result<Vec<Contributor>, DbError> {
        let mut conn = self.database.connection()?;

        let rows = schema::contributors::table
            .order((
                schema::contributors::id.asc(),
                schema::contributors::organization_id.asc(),
                schema::contributors::snapshot_date.asc(),
            ))
            .select(ContributorRow::as_select())
            .load(&mut conn)?;

        debug!(count = rows.len(), "Contributors loaded");
        Ok(rows.into_iter().map(Contributor::from).collect())
    }

    /// Lists every snapshot of the contributors of `name`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_by_organization_name(&self, name: &str) -> Result<Vec<Contributor>, DbError> {
        let mut conn = self.database.connection()?;

        let rows = schema::contributors::table
            .filter(schema::contributors::organization_name.eq(name))
            .order((
                schema::contributors::snapshot_date.desc(),
                schema::contributors::id.asc(),
            ))
            .select(ContributorRow::as_select())
            .load(&mut conn)?;

        debug!(organization = %name, count = rows.len(), "Contributors loaded");
        Ok(rows.into_iter().map(Contributor::from).collect())
    }

    /// Lists the contributors of the most recent contributor snapshot of
    /// `organization`, most organizational commits first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_contributors(
        &self,
        organization: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Contributor>, DbError> {
        let mut conn = self.database.connection()?;

        let latest: Option<NaiveDateTime> = schema::contributors::table
            .filter(schema::contributors::organization_name.eq(organization))
            .select(max(schema::contributors::snapshot_date))
            .get_result(&mut conn)?;

        let Some(latest) = latest else {
            debug!(organization = %organization, "No contributor snapshot found");
            return Ok(Vec::new());
        };

        let mut query = schema::contributors::table
            .filter(schema::contributors::organization_name.eq(organization))
            .filter(schema::contributors::snapshot_date.eq(latest))
            .order((
                schema::contributors::organizational_commits_count.desc(),
                schema::contributors::id.asc(),
            ))
            .select(ContributorRow::as_select())
            .into_boxed();

        if let Some(limit) = limit {
            query = query.limit(sql_limit(limit));
        }
        if let Some(offset) = offset {
            query = query.offset(sql_limit(offset));
        }

        let rows = query.load(&mut conn)?;
        debug!(organization = %organization, count = rows.len(), "Contributors loaded");
        Ok(rows.into_iter().map(Contributor::from).collect())
    }

    /// Lists the contributors of several organizations as one listing.
    ///
    /// Each organization contributes its own latest snapshot; the merged
    /// listing keeps the most-commits-first order before `offset` and
    /// `limit` apply.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_contributors_in(
        &self,
        organizations: &[String],
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Contributor>, DbError> {
        if let [organization] = organizations {
            return self.find_contributors(organization, limit, offset);
        }

        let mut contributors = Vec::new();
        for organization in organizations {
            contributors.extend(self.find_contributors(organization, None, None)?);
        }
        contributors.sort_by(|a, b| {
            b.organizational_commits_count()
                .cmp(a.organizational_commits_count())
                .then_with(|| a.key().id().cmp(&b.key().id()))
        });

        Ok(contributors
            .into_iter()
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }
}

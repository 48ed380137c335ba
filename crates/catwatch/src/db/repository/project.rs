//! Project snapshot store.

use chrono::NaiveDateTime;
use diesel::dsl::max;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

use super::statistics::sql_limit;
use crate::db::project::{ProjectRecord, ProjectRow};
use crate::db::{Database, DbError, Project, ProjectFilter, ProjectSort, schema, truncate_to_millis};

/// Store for organization projects.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    database: Database,
}

impl ProjectRepository {
    /// Creates a repository backed by `database`.
    #[instrument(skip(database), fields(url = %database.url()))]
    pub fn new(database: Database) -> Self {
        info!("Creating ProjectRepository");
        Self { database }
    }

    /// Saves a project.
    ///
    /// A project without an id is inserted and receives a store-assigned id;
    /// a project with an id replaces the stored row with that id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, project), fields(id = ?project.id(), name = %project.name()))]
    pub fn save(&self, project: &Project) -> Result<Project, DbError> {
        let record = ProjectRecord::from(project);
        let mut conn = self.database.connection()?;

        let saved = match record.id {
            None => {
                debug!("Inserting new project");
                diesel::insert_into(schema::projects::table)
                    .values(&record)
                    .returning(ProjectRow::as_returning())
                    .get_result(&mut conn)?
            }
            Some(id) => {
                debug!(id, "Replacing project");
                conn.transaction::<_, DbError, _>(|conn| {
                    diesel::replace_into(schema::projects::table)
                        .values(&record)
                        .execute(conn)?;

                    let saved = schema::projects::table
                        .find(id)
                        .select(ProjectRow::as_select())
                        .first(conn)?;
                    Ok(saved)
                })?
            }
        };

        info!(id = saved.id, "Project saved");
        Ok(saved.into())
    }

    /// Saves every project in order.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first failure.
    #[instrument(skip(self, projects), fields(count = projects.len()))]
    pub fn save_all(&self, projects: &[Project]) -> Result<Vec<Project>, DbError> {
        projects.iter().map(|p| self.save(p)).collect()
    }

    /// Removes every project and returns how many were deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_all(&self) -> Result<usize, DbError> {
        let mut conn = self.database.connection()?;
        let deleted = diesel::delete(schema::projects::table).execute(&mut conn)?;
        info!(deleted, "Projects deleted");
        Ok(deleted)
    }

    /// Lists every project, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_all(&self) -> Result<Vec<Project>, DbError> {
        let mut conn = self.database.connection()?;

        let rows = schema::projects::table
            .order(schema::projects::id.asc())
            .select(ProjectRow::as_select())
            .load(&mut conn)?;

        debug!(count = rows.len(), "Projects loaded");
        Ok(rows.into_iter().map(Project::from).collect())
    }

    /// Lists the projects of the most recent snapshot of `organization`
    /// within the filter's date window, matching its name and language
    /// filters, in the filter's order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_projects(
        &self,
        organization: &str,
        filter: &ProjectFilter,
    ) -> Result<Vec<Project>, DbError> {
        use schema::projects::dsl;

        let mut conn = self.database.connection()?;

        let mut latest_query = dsl::projects
            .select(max(dsl::snapshot_date))
            .filter(dsl::organization_name.eq(organization))
            .into_boxed();
        if let Some(start) = filter.start_date() {
            latest_query = latest_query.filter(dsl::snapshot_date.ge(truncate_to_millis(*start).naive_utc()));
        }
        if let Some(end) = filter.end_date() {
            latest_query = latest_query.filter(dsl::snapshot_date.le(truncate_to_millis(*end).naive_utc()));
        }
        let latest: Option<NaiveDateTime> = latest_query.get_result(&mut conn)?;

        let Some(latest) = latest else {
            debug!(organization = %organization, "No project snapshot found");
            return Ok(Vec::new());
        };

        let mut query = dsl::projects
            .filter(dsl::organization_name.eq(organization))
            .filter(dsl::snapshot_date.eq(latest))
            .select(ProjectRow::as_select())
            .into_boxed();

        if let Some(text) = filter.query() {
            query = query.filter(dsl::name.like(like_pattern(text)).escape('\\'));
        }
        if let Some(language) = filter.language() {
            query = query.filter(dsl::primary_language.eq(language.clone()));
        }

        query = match filter.sort_by() {
            ProjectSort::Score => query.order(dsl::score.desc()),
            ProjectSort::Stars => query.order(dsl::stars_count.desc()),
            ProjectSort::Forks => query.order(dsl::forks_count.desc()),
            ProjectSort::Commits => query.order(dsl::commits_count.desc()),
            ProjectSort::Contributors => query.order(dsl::contributors_count.desc()),
            ProjectSort::Name => query.order(dsl::name.asc()),
        };
        query = query.then_order_by(dsl::name.asc()).then_order_by(dsl::id.asc());

        if let Some(limit) = filter.limit() {
            query = query.limit(sql_limit(*limit));
        }
        if let Some(offset) = filter.offset() {
            query = query.offset(sql_limit(*offset));
        }

        let rows = query.load(&mut conn)?;
        debug!(organization = %organization, count = rows.len(), "Projects loaded");
        Ok(rows.into_iter().map(Project::from).collect())
    }

    /// Lists the projects of several organizations as one listing.
    ///
    /// Each organization contributes its own latest snapshot; ordering,
    /// offset and limit apply to the merged listing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_projects_in(
        &self,
        organizations: &[String],
        filter: &ProjectFilter,
    ) -> Result<Vec<Project>, DbError> {
        if let [organization] = organizations {
            return self.find_projects(organization, filter);
        }

        let unpaged = filter.unpaged();
        let mut projects = Vec::new();
        for organization in organizations {
            projects.extend(self.find_projects(organization, &unpaged)?);
        }
        projects.sort_by(|a, b| filter.sort_by().compare(a, b));
        Ok(filter.paginate(projects))
    }
}

/// Builds a `LIKE` pattern matching names containing `text` literally.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

//! Administrative operations: bulk export/import, wipe, test data, rescoring.

mod bundle;
mod populator;

pub use bundle::{DatabaseBundle, ImportSummary};
pub use populator::{RECORDS_PER_SNAPSHOT, SNAPSHOT_DAYS};

use chrono::Utc;
use tracing::{info, instrument};

use crate::db::{ContributorRepository, Database, DbError, ProjectRepository, StatisticsRepository};
use crate::scoring::{ScoreReport, Scorer, ScoringPass};

/// Service layer for whole-database administration.
#[derive(Debug, Clone)]
pub struct AdminService {
    statistics: StatisticsRepository,
    projects: ProjectRepository,
    contributors: ContributorRepository,
}

impl AdminService {
    /// Creates a service over every repository of `database`.
    #[instrument(skip(database), fields(url = %database.url()))]
    pub fn new(database: Database) -> Self {
        info!("Creating AdminService");
        Self {
            statistics: StatisticsRepository::new(database.clone()),
            projects: ProjectRepository::new(database.clone()),
            contributors: ContributorRepository::new(database),
        }
    }

    /// Returns the project repository.
    pub fn projects(&self) -> &ProjectRepository {
        &self.projects
    }

    /// Reads every stored record into one bundle.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn export(&self) -> Result<DatabaseBundle, DbError> {
        let bundle = DatabaseBundle::new(
            self.contributors.find_all()?,
            self.projects.find_all()?,
            self.statistics.find_all()?,
        );
        info!(
            contributors = bundle.contributors.len(),
            projects = bundle.projects.len(),
            statistics = bundle.statistics.len(),
            "Database exported"
        );
        Ok(bundle)
    }

    /// Saves every record of the bundle.
    ///
    /// Collections are written in the order contributors, projects,
    /// statistics. Projects carrying an id replace the stored project with
    /// that id; projects without one are inserted.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first failure; records saved before it stay
    /// saved.
    #[instrument(skip(self, bundle))]
    pub fn import(&self, bundle: &DatabaseBundle) -> Result<ImportSummary, DbError> {
        let contributors = self.contributors.save_all(&bundle.contributors)?.len();
        let projects = self.projects.save_all(&bundle.projects)?.len();
        let statistics = self.statistics.save_all(&bundle.statistics)?.len();

        let summary = ImportSummary::new(contributors, projects, statistics);
        info!(?summary, "Database imported");
        Ok(summary)
    }

    /// Removes every contributor, project and statistics record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_all(&self) -> Result<ImportSummary, DbError> {
        let summary = ImportSummary::new(
            self.contributors.delete_all()?,
            self.projects.delete_all()?,
            self.statistics.delete_all()?,
        );
        info!(?summary, "Database cleared");
        Ok(summary)
    }

    /// Seeds the store with deterministic snapshots for `organizations`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn populate_test_data(&self, organizations: &[String]) -> Result<ImportSummary, DbError> {
        let bundle = populator::test_data(organizations, Utc::now());
        self.import(&bundle)
    }

    /// Recomputes the scores of the latest projects of each organization.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the projects of an organization cannot be
    /// listed.
    #[instrument(skip(self, scorer))]
    pub fn rescore<S: Scorer>(&self, organizations: &str, scorer: &S) -> Result<ScoreReport, DbError> {
        ScoringPass::new(&self.projects, scorer).run(organizations)
    }
}

//! Catwatch - GitHub organization statistics snapshots
//!
//! Stores point-in-time metric snapshots of GitHub organizations, their
//! projects and contributors in SQLite, and serves them over a REST API.
//!
//! # Architecture
//!
//! - **Store**: diesel repositories for statistics, projects and contributors
//! - **Scoring**: formula-driven ranking of the latest project snapshot
//! - **Admin**: export, import, wipe and test-data population
//! - **API**: axum router over the read model and admin operations
//!
//! # Example
//!
//! ```no_run
//! use catwatch::{Database, Statistics, StatisticsRepository};
//! use chrono::Utc;
//!
//! # fn example() -> Result<(), catwatch::DbError> {
//! let database = Database::new("catwatch.db");
//! database.run_migrations()?;
//!
//! let repository = StatisticsRepository::new(database);
//! let snapshot = Statistics::new(42, Utc::now())
//!     .with_organization_name("zalando")
//!     .with_members_count(120);
//! repository.save(&snapshot)?;
//!
//! let latest = repository.find_latest_by_organization_name("zalando", 1)?;
//! assert_eq!(latest.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod admin;
mod api;
mod config;
mod db;
mod scoring;
mod statistics_service;

// Crate-level exports - Store
pub use db::{
    Contributor, ContributorKey, ContributorRepository, Database, DbError, DbErrorKind, Project,
    ProjectFilter, ProjectRepository, ProjectSort, Statistics, StatisticsKey, StatisticsRepository,
};

// Crate-level exports - Read model
pub use statistics_service::StatisticsService;

// Crate-level exports - Scoring
pub use scoring::{
    FormulaScorer, MAX_SCORING_ERRORS, ProjectField, ScoreReport, Scorer, ScoringError,
    ScoringPass, TRUNCATION_NOTICE,
};

// Crate-level exports - Administration
pub use admin::{AdminService, DatabaseBundle, ImportSummary, RECORDS_PER_SNAPSHOT, SNAPSHOT_DAYS};

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError, DEFAULT_SCORING_FORMULA, split_organizations};

// Crate-level exports - HTTP
pub use api::{ApiError, AppState, ORGANIZATIONS_HEADER, router};

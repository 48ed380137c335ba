//! Database persistence layer for organization, project and contributor snapshots.

mod contributor;
mod database;
mod error;
mod project;
mod repository;
mod schema; // Diesel generated schema - internal use only
mod statistics;

pub use contributor::{Contributor, ContributorKey};
pub use database::Database;
pub use error::{DbError, DbErrorKind};
pub use project::{Project, ProjectFilter, ProjectSort};
pub use repository::{ContributorRepository, ProjectRepository, StatisticsRepository};
pub use statistics::{Statistics, StatisticsKey};

pub(crate) use statistics::truncate_to_millis;

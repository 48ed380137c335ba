//! Repositories over the snapshot tables.

mod contributor;
mod project;
mod statistics;

pub use contributor::ContributorRepository;
pub use project::ProjectRepository;
pub use statistics::StatisticsRepository;

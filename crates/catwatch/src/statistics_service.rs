//! Read model over organization statistics.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::{DbError, Statistics, StatisticsRepository};

/// Service layer answering statistics queries for several organizations.
///
/// Wraps [`StatisticsRepository`]; results keep the order of the requested
/// organizations.
#[derive(Debug, Clone)]
pub struct StatisticsService {
    repository: StatisticsRepository,
}

impl StatisticsService {
    /// Creates a new statistics service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: StatisticsRepository) -> Self {
        info!("Creating StatisticsService");
        Self { repository }
    }

    /// Returns the most recent snapshot of each organization that has one.
    #[instrument(skip(self))]
    pub fn latest(&self, organizations: &[String]) -> Result<Vec<Statistics>, DbError> {
        let mut result = Vec::new();
        for organization in organizations {
            let latest = self.repository.find_latest_by_organization_name(organization, 1)?;
            debug!(organization = %organization, found = !latest.is_empty(), "Latest snapshot");
            result.extend(latest);
        }
        Ok(result)
    }

    /// Returns every snapshot of each organization within `[start, end]`,
    /// grouped by organization and most recent first within a group.
    #[instrument(skip(self))]
    pub fn in_period(
        &self,
        organizations: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Statistics>, DbError> {
        let mut result = Vec::new();
        for organization in organizations {
            result.extend(self.repository.find_in_period(organization, start, end)?);
        }
        info!(count = result.len(), "Statistics in period collected");
        Ok(result)
    }
}

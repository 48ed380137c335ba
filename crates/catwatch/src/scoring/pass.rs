//! Recomputes project scores for a list of organizations.

use derive_getters::Getters;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::split_organizations;
use crate::db::{DbError, ProjectFilter, ProjectRepository};
use crate::scoring::Scorer;

/// Number of per-project failures tolerated before the pass stops.
pub const MAX_SCORING_ERRORS: usize = 5;

/// Notice appended when the pass stops early.
pub const TRUNCATION_NOTICE: &str = "score update stopped due to errors";

/// Outcome of a scoring pass.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct ScoreReport {
    /// Projects whose new score was saved.
    updated: usize,
    /// Per-project failures, followed by the truncation notice if the pass
    /// stopped early.
    errors: Vec<String>,
}

impl ScoreReport {
    /// Returns `true` if any project failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns the messages reported to the caller: the update count on
    /// success, otherwise the collected failures.
    pub fn into_messages(self) -> Vec<String> {
        if self.errors.is_empty() {
            vec![format!("{} project object(s) updated", self.updated)]
        } else {
            self.errors
        }
    }
}

/// Scores every project of the latest snapshot of each organization.
#[derive(Debug)]
pub struct ScoringPass<'a, S> {
    projects: &'a ProjectRepository,
    scorer: &'a S,
}

impl<'a, S: Scorer> ScoringPass<'a, S> {
    /// Creates a pass that persists scores through `projects`.
    pub fn new(projects: &'a ProjectRepository, scorer: &'a S) -> Self {
        Self { projects, scorer }
    }

    /// Runs the pass over a comma-separated list of organization names.
    ///
    /// Failures to score or save a single project are collected in the
    /// report. Once more than [`MAX_SCORING_ERRORS`] have been collected the
    /// remaining projects are skipped and [`TRUNCATION_NOTICE`] is appended.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the projects of an organization cannot be
    /// listed.
    #[instrument(skip(self))]
    pub fn run(&self, organizations: &str) -> Result<ScoreReport, DbError> {
        let mut errors = Vec::new();
        let mut updated = 0;

        'organizations: for organization in split_organizations(organizations) {
            let projects = self.projects.find_projects(&organization, &ProjectFilter::default())?;
            debug!(organization = %organization, count = projects.len(), "Scoring projects");

            for mut project in projects {
                if errors.len() > MAX_SCORING_ERRORS {
                    break 'organizations;
                }

                let result = self.scorer.score(&project).map_err(|e| e.message).and_then(|score| {
                    project.set_score(score);
                    self.projects.save(&project).map_err(|e| e.message)
                });

                match result {
                    Ok(_) => updated += 1,
                    Err(message) => {
                        if errors.is_empty() {
                            error!(project = %project.name(), error = %message, "First scoring failure");
                        }
                        errors.push(format!("project {}: {}", project.name(), message));
                    }
                }
            }
        }

        if errors.len() > MAX_SCORING_ERRORS {
            warn!(failures = errors.len(), "Scoring pass stopped early");
            errors.push(TRUNCATION_NOTICE.to_string());
        }

        info!(updated, failures = errors.len(), "Scoring pass finished");
        Ok(ScoreReport { updated, errors })
    }
}

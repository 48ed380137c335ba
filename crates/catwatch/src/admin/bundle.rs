//! Whole-database export bundle.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::db::{Contributor, Project, Statistics};

/// Every stored snapshot, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct DatabaseBundle {
    /// Contributor snapshots.
    #[serde(default)]
    pub contributors: Vec<Contributor>,
    /// Project snapshots.
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Organization statistics snapshots.
    #[serde(default)]
    pub statistics: Vec<Statistics>,
}

impl DatabaseBundle {
    /// Returns `true` if the bundle holds no records.
    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty() && self.projects.is_empty() && self.statistics.is_empty()
    }
}

/// Record counts written by an import or a test-data population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters, Serialize, new)]
pub struct ImportSummary {
    contributors: usize,
    projects: usize,
    statistics: usize,
}

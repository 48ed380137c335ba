//! Project snapshots.

use chrono::{DateTime, NaiveDateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use derive_setters::Setters;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{Display, EnumIter, EnumString};

use crate::db::{schema, truncate_to_millis};

/// One repository of an organization, as captured by a snapshot.
///
/// `id` is assigned by the store on first save.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
#[setters(prefix = "with_", strip_option, into)]
pub struct Project {
    #[new(default)]
    #[serde(default)]
    id: Option<i32>,
    git_hub_project_id: i64,
    snapshot_date: DateTime<Utc>,
    name: String,
    organization_name: String,
    #[new(default)]
    #[serde(default)]
    url: Option<String>,
    #[new(default)]
    #[serde(default)]
    description: Option<String>,
    #[new(default)]
    #[serde(default)]
    primary_language: Option<String>,
    #[new(default)]
    #[serde(default)]
    stars_count: i32,
    #[new(default)]
    #[serde(default)]
    forks_count: i32,
    #[new(default)]
    #[serde(default)]
    commits_count: i32,
    #[new(default)]
    #[serde(default)]
    contributors_count: i32,
    #[new(default)]
    #[serde(default)]
    score: Option<i32>,
}

impl Project {
    /// Replaces the ranking score.
    pub fn set_score(&mut self, score: i32) {
        self.score = Some(score);
    }
}

/// Ordering of a project listing.
///
/// Counter orders are descending; every order falls back to name, then id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum ProjectSort {
    /// Highest score first, unscored projects last.
    #[default]
    Score,
    /// Most stars first.
    Stars,
    /// Most forks first.
    Forks,
    /// Most commits first.
    Commits,
    /// Most contributors first.
    Contributors,
    /// Alphabetical by name.
    Name,
}

impl ProjectSort {
    /// Compares two projects the way the store orders them.
    pub fn compare(self, a: &Project, b: &Project) -> Ordering {
        let primary = match self {
            Self::Score => b.score.cmp(&a.score),
            Self::Stars => b.stars_count.cmp(&a.stars_count),
            Self::Forks => b.forks_count.cmp(&a.forks_count),
            Self::Commits => b.commits_count.cmp(&a.commits_count),
            Self::Contributors => b.contributors_count.cmp(&a.contributors_count),
            Self::Name => Ordering::Equal,
        };
        primary
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Selection of a project listing.
///
/// The listing uses the most recent snapshot of an organization taken
/// within `[start_date, end_date]` (either bound optional).
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Setters)]
#[setters(prefix = "with_", into)]
pub struct ProjectFilter {
    /// Maximum number of projects returned.
    limit: Option<usize>,
    /// Number of projects skipped.
    offset: Option<usize>,
    /// Earliest snapshot considered.
    start_date: Option<DateTime<Utc>>,
    /// Latest snapshot considered.
    end_date: Option<DateTime<Utc>>,
    /// Listing order.
    sort_by: ProjectSort,
    /// Substring the project name must contain.
    query: Option<String>,
    /// Exact primary language.
    language: Option<String>,
}

impl ProjectFilter {
    /// Returns the same selection without limit and offset.
    pub fn unpaged(&self) -> Self {
        Self {
            limit: None,
            offset: None,
            ..self.clone()
        }
    }

    /// Applies offset and limit to an already ordered listing.
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

/// Project row as read from the `projects` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::projects)]
pub(crate) struct ProjectRow {
    pub(crate) id: i32,
    git_hub_project_id: i64,
    snapshot_date: NaiveDateTime,
    name: String,
    url: Option<String>,
    description: Option<String>,
    primary_language: Option<String>,
    organization_name: String,
    stars_count: i32,
    forks_count: i32,
    commits_count: i32,
    contributors_count: i32,
    score: Option<i32>,
}

/// Insertable project row; a missing `id` lets the store assign one.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::projects)]
pub(crate) struct ProjectRecord {
    pub(crate) id: Option<i32>,
    git_hub_project_id: i64,
    snapshot_date: NaiveDateTime,
    name: String,
    url: Option<String>,
    description: Option<String>,
    primary_language: Option<String>,
    organization_name: String,
    stars_count: i32,
    forks_count: i32,
    commits_count: i32,
    contributors_count: i32,
    score: Option<i32>,
}

impl From<&Project> for ProjectRecord {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            git_hub_project_id: project.git_hub_project_id,
            snapshot_date: truncate_to_millis(project.snapshot_date).naive_utc(),
            name: project.name.clone(),
            url: project.url.clone(),
            description: project.description.clone(),
            primary_language: project.primary_language.clone(),
            organization_name: project.organization_name.clone(),
            stars_count: project.stars_count,
            forks_count: project.forks_count,
            commits_count: project.commits_count,
            contributors_count: project.contributors_count,
            score: project.score,
        }
    }
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: Some(row.id),
            git_hub_project_id: row.git_hub_project_id,
            snapshot_date: row.snapshot_date.and_utc(),
            name: row.name,
            organization_name: row.organization_name,
            url: row.url,
            description: row.description,
            primary_language: row.primary_language,
            stars_count: row.stars_count,
            forks_count: row.forks_count,
            commits_count: row.commits_count,
            contributors_count: row.contributors_count,
            score: row.score,
        }
    }
}

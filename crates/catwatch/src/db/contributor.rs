//! Contributor snapshots.

use chrono::{DateTime, NaiveDateTime, Utc};
use derive_getters::Getters;
use derive_setters::Setters;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::{schema, truncate_to_millis};

/// Identity of a contributor snapshot within one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributorKey {
    /// GitHub id of the user.
    id: i64,
    /// GitHub id of the organization the counts refer to.
    organization_id: i64,
    /// Point in time the snapshot was taken.
    snapshot_date: DateTime<Utc>,
}

impl ContributorKey {
    /// Creates a key; the snapshot date is truncated to milliseconds.
    pub fn new(id: i64, organization_id: i64, snapshot_date: DateTime<Utc>) -> Self {
        Self {
            id,
            organization_id,
            snapshot_date: truncate_to_millis(snapshot_date),
        }
    }

    /// Returns the user id.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the organization id.
    pub fn organization_id(&self) -> i64 {
        self.organization_id
    }

    /// Returns the snapshot date.
    pub fn snapshot_date(&self) -> DateTime<Utc> {
        self.snapshot_date
    }
}

/// Activity counts of one user within one organization at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[setters(prefix = "with_", strip_option, into)]
pub struct Contributor {
    #[serde(flatten)]
    #[setters(skip)]
    key: ContributorKey,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    organization_name: Option<String>,
    #[serde(default)]
    organizational_commits_count: Option<i32>,
    #[serde(default)]
    personal_commits_count: Option<i32>,
    #[serde(default)]
    personal_projects_count: Option<i32>,
    #[serde(default)]
    organizational_projects_count: Option<i32>,
}

impl Contributor {
    /// Creates a contributor snapshot with every count unset.
    pub fn new(id: i64, organization_id: i64, snapshot_date: DateTime<Utc>) -> Self {
        Self {
            key: ContributorKey::new(id, organization_id, snapshot_date),
            name: None,
            url: None,
            organization_name: None,
            organizational_commits_count: None,
            personal_commits_count: None,
            personal_projects_count: None,
            organizational_projects_count: None,
        }
    }
}

/// Contributor row as stored in the `contributors` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::contributors)]
pub(crate) struct ContributorRow {
    pub(crate) id: i64,
    pub(crate) organization_id: i64,
    pub(crate) snapshot_date: NaiveDateTime,
    name: Option<String>,
    url: Option<String>,
    organization_name: Option<String>,
    organizational_commits_count: Option<i32>,
    personal_commits_count: Option<i32>,
    personal_projects_count: Option<i32>,
    organizational_projects_count: Option<i32>,
}

impl From<&Contributor> for ContributorRow {
    fn from(contributor: &Contributor) -> Self {
        Self {
            id: contributor.key.id,
            organization_id: contributor.key.organization_id,
            snapshot_date: truncate_to_millis(contributor.key.snapshot_date).naive_utc(),
            name: contributor.name.clone(),
            url: contributor.url.clone(),
            organization_name: contributor.organization_name.clone(),
            organizational_commits_count: contributor.organizational_commits_count,
            personal_commits_count: contributor.personal_commits_count,
            personal_projects_count: contributor.personal_projects_count,
            organizational_projects_count: contributor.organizational_projects_count,
        }
    }
}

impl From<ContributorRow> for Contributor {
    fn from(row: ContributorRow) -> Self {
        Self {
            key: ContributorKey {
                id: row.id,
                organization_id: row.organization_id,
                snapshot_date: row.snapshot_date.and_utc(),
            },
            name: row.name,
            url: row.url,
            organization_name: row.organization_name,
            organizational_commits_count: row.organizational_commits_count,
            personal_commits_count: row.personal_commits_count,
            personal_projects_count: row.personal_projects_count,
            organizational_projects_count: row.organizational_projects_count,
        }
    }
}

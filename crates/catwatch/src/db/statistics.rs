//! Organization statistics snapshots and their composite key.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use derive_getters::Getters;
use derive_setters::Setters;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::{DbError, schema};

/// Truncates a timestamp to the millisecond precision kept by the store.
pub(crate) fn truncate_to_millis(date: DateTime<Utc>) -> DateTime<Utc> {
    date.trunc_subsecs(3)
}

/// Composite identity of a statistics snapshot.
///
/// Two keys are equal only when both the organization id and the snapshot
/// date match exactly. Snapshot dates are kept at millisecond precision.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsKey {
    /// GitHub id of the organization.
    #[serde(rename = "id")]
    organization_id: Option<i64>,
    /// Point in time the snapshot was taken.
    snapshot_date: Option<DateTime<Utc>>,
}

impl StatisticsKey {
    /// Creates a complete key.
    #[instrument]
    pub fn new(organization_id: i64, snapshot_date: DateTime<Utc>) -> Self {
        Self {
            organization_id: Some(organization_id),
            snapshot_date: Some(truncate_to_millis(snapshot_date)),
        }
    }

    /// Returns the organization id, if set.
    pub fn organization_id(&self) -> Option<i64> {
        self.organization_id
    }

    /// Returns the snapshot date, if set.
    pub fn snapshot_date(&self) -> Option<DateTime<Utc>> {
        self.snapshot_date
    }

    /// Replaces the snapshot date.
    pub fn set_snapshot_date(&mut self, snapshot_date: DateTime<Utc>) {
        self.snapshot_date = Some(truncate_to_millis(snapshot_date));
    }

    /// Returns both key parts in their stored form.
    ///
    /// # Errors
    ///
    /// Returns a validation [`DbError`] if either part is missing or the
    /// organization id is negative.
    #[instrument]
    pub(crate) fn to_stored(self) -> Result<(i64, NaiveDateTime), DbError> {
        let organization_id = self
            .organization_id
            .ok_or_else(|| DbError::validation("Statistics key has no organization id"))?;
        if organization_id < 0 {
            return Err(DbError::validation(format!(
                "Statistics key has negative organization id {}",
                organization_id
            )));
        }
        let snapshot_date = self
            .snapshot_date
            .ok_or_else(|| DbError::validation("Statistics key has no snapshot date"))?;

        Ok((organization_id, truncate_to_millis(snapshot_date).naive_utc()))
    }
}

/// One organization's metric snapshot at one point in time.
///
/// Every counter is optional: `None` means "not measured", which is distinct
/// from a measured zero and survives a save/load cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[setters(prefix = "with_", strip_option, into)]
pub struct Statistics {
    #[serde(flatten)]
    #[setters(skip)]
    key: StatisticsKey,
    #[serde(default)]
    organization_name: Option<String>,
    #[serde(default)]
    private_project_count: Option<i32>,
    #[serde(default)]
    public_project_count: Option<i32>,
    #[serde(default)]
    members_count: Option<i32>,
    #[serde(default)]
    teams_count: Option<i32>,
    #[serde(default)]
    all_contributors_count: Option<i32>,
    #[serde(default)]
    all_stars_count: Option<i32>,
    #[serde(default)]
    all_forks_count: Option<i32>,
    #[serde(default)]
    all_size_count: Option<i32>,
    #[serde(default)]
    program_languages_count: Option<i32>,
    #[serde(default)]
    tags_count: Option<i32>,
}

impl Statistics {
    /// Creates an empty snapshot for an organization at a point in time.
    #[instrument]
    pub fn new(organization_id: i64, snapshot_date: DateTime<Utc>) -> Self {
        Self {
            key: StatisticsKey::new(organization_id, snapshot_date),
            ..Self::default()
        }
    }

    /// Returns the organization id, or `0` when the key is incomplete.
    pub fn id(&self) -> i64 {
        self.key.organization_id().unwrap_or_default()
    }

    /// Returns the snapshot date, if set.
    pub fn snapshot_date(&self) -> Option<DateTime<Utc>> {
        self.key.snapshot_date()
    }

    /// Replaces the snapshot date, keeping the organization id.
    pub fn set_snapshot_date(&mut self, snapshot_date: DateTime<Utc>) {
        self.key.set_snapshot_date(snapshot_date);
    }

    /// Builder form of [`Statistics::set_snapshot_date`].
    pub fn with_snapshot_date(mut self, snapshot_date: DateTime<Utc>) -> Self {
        self.set_snapshot_date(snapshot_date);
        self
    }

    /// Replaces the organization display name.
    pub fn set_organization_name(&mut self, organization_name: impl Into<String>) {
        self.organization_name = Some(organization_name.into());
    }
}

/// Statistics row as stored in the `statistics` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = schema::statistics)]
pub(crate) struct StatisticsRow {
    pub(crate) organization_id: i64,
    pub(crate) snapshot_date: NaiveDateTime,
    organization_name: Option<String>,
    private_project_count: Option<i32>,
    public_project_count: Option<i32>,
    members_count: Option<i32>,
    teams_count: Option<i32>,
    all_contributors_count: Option<i32>,
    all_stars_count: Option<i32>,
    all_forks_count: Option<i32>,
    all_size_count: Option<i32>,
    program_languages_count: Option<i32>,
    tags_count: Option<i32>,
}

impl TryFrom<&Statistics> for StatisticsRow {
    type Error = DbError;

    fn try_from(statistics: &Statistics) -> Result<Self, Self::Error> {
        let (organization_id, snapshot_date) = statistics.key.to_stored()?;
        Ok(Self {
            organization_id,
            snapshot_date,
            organization_name: statistics.organization_name.clone(),
            private_project_count: statistics.private_project_count,
            public_project_count: statistics.public_project_count,
            members_count: statistics.members_count,
            teams_count: statistics.teams_count,
            all_contributors_count: statistics.all_contributors_count,
            all_stars_count: statistics.all_stars_count,
            all_forks_count: statistics.all_forks_count,
            all_size_count: statistics.all_size_count,
            program_languages_count: statistics.program_languages_count,
            tags_count: statistics.tags_count,
        })
    }
}

impl From<StatisticsRow> for Statistics {
    fn from(row: StatisticsRow) -> Self {
        Self {
            key: StatisticsKey {
                organization_id: Some(row.organization_id),
                snapshot_date: Some(row.snapshot_date.and_utc()),
            },
            organization_name: row.organization_name,
            private_project_count: row.private_project_count,
            public_project_count: row.public_project_count,
            members_count: row.members_count,
            teams_count: row.teams_count,
            all_contributors_count: row.all_contributors_count,
            all_stars_count: row.all_stars_count,
            all_forks_count: row.all_forks_count,
            all_size_count: row.all_size_count,
            program_languages_count: row.program_languages_count,
            tags_count: row.tags_count,
        }
    }
}

//! Deterministic test data for local development.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use tracing::{debug, instrument};

use crate::admin::DatabaseBundle;
use crate::db::{Contributor, Project, Statistics};

/// Daily snapshots generated per organization.
pub const SNAPSHOT_DAYS: i64 = 5;

/// Projects and contributors generated per organization and snapshot.
pub const RECORDS_PER_SNAPSHOT: i64 = 3;

/// Derives a stable pseudo GitHub id from an organization name.
fn organization_id(name: &str) -> i64 {
    name.bytes()
        .fold(17_i64, |acc, b| (acc * 31 + i64::from(b)) % 1_000_000)
}

fn count(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Builds a bundle of daily snapshots ending at `now` for each organization.
///
/// The newest snapshot is taken at `now` (truncated to whole seconds) and
/// counters grow towards it, so "latest" queries have a clear winner.
#[instrument(skip(organizations), fields(count = organizations.len()))]
pub fn test_data(organizations: &[String], now: DateTime<Utc>) -> DatabaseBundle {
    let now = now.trunc_subsecs(0);
    let mut bundle = DatabaseBundle::default();

    for name in organizations {
        let org_id = organization_id(name);

        for day in 0..SNAPSHOT_DAYS {
            let snapshot_date = now - Duration::days(day);
            let growth = SNAPSHOT_DAYS - day;

            bundle.statistics.push(
                Statistics::new(org_id, snapshot_date)
                    .with_organization_name(name.as_str())
                    .with_public_project_count(count(RECORDS_PER_SNAPSHOT))
                    .with_private_project_count(count(growth))
                    .with_members_count(count(10 * growth))
                    .with_teams_count(count(2 + growth))
                    .with_all_contributors_count(count(RECORDS_PER_SNAPSHOT))
                    .with_all_stars_count(count(100 * growth))
                    .with_all_forks_count(count(20 * growth))
                    .with_all_size_count(count(1_000 * growth))
                    .with_program_languages_count(count(2))
                    .with_tags_count(count(5 * growth)),
            );

            for index in 0..RECORDS_PER_SNAPSHOT {
                let rank = index + 1;
                bundle.projects.push(
                    Project::new(
                        org_id * 100 + index,
                        snapshot_date,
                        format!("{}-project-{}", name, rank),
                        name.clone(),
                    )
                    .with_url(format!("https://github.com/{}/{}-project-{}", name, name, rank))
                    .with_description(format!("Sample project {} of {}", rank, name))
                    .with_primary_language(if index % 2 == 0 { "Java" } else { "Rust" })
                    .with_stars_count(count(10 * rank * growth))
                    .with_forks_count(count(3 * rank * growth))
                    .with_commits_count(count(50 * rank * growth))
                    .with_contributors_count(count(rank)),
                );

                bundle.contributors.push(
                    Contributor::new(org_id * 100 + index, org_id, snapshot_date)
                        .with_name(format!("contributor-{}", rank))
                        .with_url(format!("https://github.com/contributor-{}", rank))
                        .with_organization_name(name.as_str())
                        .with_organizational_commits_count(count(20 * rank * growth))
                        .with_personal_commits_count(count(5 * rank))
                        .with_personal_projects_count(count(rank))
                        .with_organizational_projects_count(count(rank)),
                );
            }
        }

        debug!(organization = %name, org_id, "Test data generated");
    }

    bundle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_id_is_stable() {
        assert_eq!(organization_id("zalando"), organization_id("zalando"));
        assert_ne!(organization_id("zalando"), organization_id("zalando-stups"));
    }

    #[test]
    fn test_bundle_sizes() {
        let orgs = vec!["a".to_string(), "b".to_string()];
        let bundle = test_data(&orgs, Utc::now());
        assert_eq!(bundle.statistics.len(), 10);
        assert_eq!(bundle.projects.len(), 30);
        assert_eq!(bundle.contributors.len(), 30);
    }

    #[test]
    fn test_newest_snapshot_at_now() {
        let now = Utc::now();
        let orgs = vec!["a".to_string()];
        let bundle = test_data(&orgs, now);
        let newest = bundle
            .statistics
            .iter()
            .filter_map(|s| s.snapshot_date())
            .max()
            .unwrap();
        assert_eq!(newest, now.trunc_subsecs(0));
    }
}

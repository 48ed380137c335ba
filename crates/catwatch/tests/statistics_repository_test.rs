//! Tests for the statistics store.

mod common;

use catwatch::{Database, DbErrorKind, Statistics, StatisticsKey, StatisticsRepository};
use chrono::{DateTime, Duration, SubsecRound, Utc};

use common::setup_test_db;

fn setup_repository() -> (tempfile::NamedTempFile, StatisticsRepository) {
    let (db, database) = setup_test_db();
    (db, StatisticsRepository::new(database))
}

fn snapshot(id: i64, name: &str, date: DateTime<Utc>) -> Statistics {
    Statistics::new(id, date).with_organization_name(name)
}

fn dates(result: &[Statistics]) -> Vec<DateTime<Utc>> {
    result.iter().filter_map(|s| s.snapshot_date()).collect()
}

#[test]
fn test_save_returns_persisted_record() {
    let (_db, repo) = setup_repository();
    let now = Utc::now();

    let saved = repo
        .save(&snapshot(1, "zalando", now).with_members_count(7))
        .expect("Save failed");

    assert_eq!(saved.id(), 1);
    assert_eq!(saved.snapshot_date(), Some(now.trunc_subsecs(3)));
    assert_eq!(saved.organization_name().as_deref(), Some("zalando"));
    assert_eq!(*saved.members_count(), Some(7));
}

#[test]
fn test_save_same_key_twice_keeps_one_row() {
    let (_db, repo) = setup_repository();
    let now = Utc::now();
    let record = snapshot(1, "zalando", now).with_teams_count(3);

    repo.save(&record).expect("First save failed");
    repo.save(&record).expect("Second save failed");

    let all = repo.find_all().expect("Find failed");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], repo.save(&record).expect("Third save failed"));
}

#[test]
fn test_save_overrides_existing_snapshot() {
    let (_db, repo) = setup_repository();
    let now = Utc::now();

    repo.save(&snapshot(1, "zalando", now).with_members_count(10))
        .expect("First save failed");
    repo.save(&snapshot(1, "zalando-renamed", now).with_members_count(11))
        .expect("Second save failed");

    let all = repo.find_all().expect("Find failed");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].organization_name().as_deref(), Some("zalando-renamed"));
    assert_eq!(*all[0].members_count(), Some(11));

    assert!(repo
        .find_by_organization_name("zalando")
        .expect("Find failed")
        .is_empty());
    assert_eq!(
        repo.find_by_organization_name("zalando-renamed")
            .expect("Find failed")
            .len(),
        1
    );
}

#[test]
fn test_null_counters_survive_round_trip() {
    let (_db, repo) = setup_repository();
    let record = snapshot(5, "zalando", Utc::now())
        .with_all_stars_count(0)
        .with_tags_count(4);

    let saved = repo.save(&record).expect("Save failed");

    assert_eq!(*saved.all_stars_count(), Some(0));
    assert_eq!(*saved.tags_count(), Some(4));
    assert_eq!(*saved.private_project_count(), None);
    assert_eq!(*saved.program_languages_count(), None);
    assert_eq!(saved, record);
}

#[test]
fn test_save_rejects_incomplete_key() {
    let (_db, repo) = setup_repository();

    let err = repo.save(&Statistics::default()).expect_err("Save should fail");
    assert_eq!(err.kind, DbErrorKind::Validation);

    let err = repo
        .save(&Statistics::new(-1, Utc::now()))
        .expect_err("Negative id should fail");
    assert_eq!(err.kind, DbErrorKind::Validation);

    assert!(repo.find_all().expect("Find failed").is_empty());
}

#[test]
fn test_default_key_saved_after_setting_date() {
    let (_db, repo) = setup_repository();
    let mut record = Statistics::default();
    record.set_snapshot_date(Utc::now());

    // The organization id is still unset.
    assert!(repo.save(&record).is_err());

    let record = Statistics::new(9, Utc::now()).with_snapshot_date(Utc::now() - Duration::hours(1));
    let saved = repo.save(&record).expect("Save failed");
    assert_eq!(saved.key(), record.key());
}

#[test]
fn test_find_by_organization_name_filters_exactly() {
    let (_db, repo) = setup_repository();
    let now = Utc::now();

    repo.save(&snapshot(1, "zalando", now)).expect("Save failed");
    repo.save(&snapshot(1, "zalando", now - Duration::days(1)))
        .expect("Save failed");
    repo.save(&snapshot(2, "zalando-stups", now)).expect("Save failed");

    let found = repo.find_by_organization_name("zalando").expect("Find failed");
    assert_eq!(found.len(), 2);
    assert!(found
        .iter()
        .all(|s| s.organization_name().as_deref() == Some("zalando")));

    let none = repo.find_by_organization_name("zal").expect("Find failed");
    assert!(none.is_empty());
}

#[test]
fn test_find_latest_independent_of_save_order() {
    let (_db, repo) = setup_repository();
    let now = Utc::now();

    let s1 = snapshot(1, "organization1", now - Duration::seconds(60));
    let s2 = snapshot(1, "organization1", now);
    let s3 = snapshot(1, "organization1", now - Duration::seconds(30));
    let s4 = snapshot(2, "organization2", now + Duration::seconds(30));
    for record in [&s1, &s2, &s3, &s4] {
        repo.save(record).expect("Save failed");
    }

    let latest = repo
        .find_latest_by_organization_name("organization1", 1)
        .expect("Find failed");
    assert_eq!(latest, vec![s2.clone()]);

    let all = repo
        .find_latest_by_organization_name("organization1", 10)
        .expect("Find failed");
    assert_eq!(all, vec![s2, s3, s1]);
}

#[test]
fn test_find_latest_breaks_ties_by_organization_id() {
    let (_db, repo) = setup_repository();
    let now = Utc::now();

    repo.save(&snapshot(20, "shared", now)).expect("Save failed");
    repo.save(&snapshot(10, "shared", now)).expect("Save failed");

    let latest = repo
        .find_latest_by_organization_name("shared", 2)
        .expect("Find failed");
    let ids: Vec<i64> = latest.iter().map(Statistics::id).collect();
    assert_eq!(ids, [10, 20]);
}

#[test]
fn test_find_in_period_includes_boundaries() {
    let (_db, repo) = setup_repository();
    let now = Utc::now();

    for days in [4, 3, 2, 1] {
        repo.save(&snapshot(1, "A", now - Duration::days(days)))
            .expect("Save failed");
    }
    repo.save(&snapshot(2, "B", now - Duration::days(2)))
        .expect("Save failed");

    let found = repo
        .find_in_period("A", now - Duration::days(3), now - Duration::days(2))
        .expect("Find failed");

    assert_eq!(
        dates(&found),
        [
            (now - Duration::days(2)).trunc_subsecs(3),
            (now - Duration::days(3)).trunc_subsecs(3),
        ]
    );
    assert!(found.iter().all(|s| s.id() == 1));
}

#[test]
fn test_find_in_period_with_sub_millisecond_bounds() {
    let (_db, repo) = setup_repository();
    let start = Utc::now();
    let end = start + Duration::minutes(1);

    repo.save(&snapshot(1, "A", start)).expect("Save failed");
    repo.save(&snapshot(1, "A", end)).expect("Save failed");

    let found = repo.find_in_period("A", start, end).expect("Find failed");
    assert_eq!(found.len(), 2);
}

#[test]
fn test_empty_store_queries() {
    let (_db, repo) = setup_repository();
    let now = Utc::now();

    assert!(repo.find_all().expect("Find failed").is_empty());
    assert!(repo
        .find_by_organization_name("zalando")
        .expect("Find failed")
        .is_empty());
    assert!(repo
        .find_latest_by_organization_name("zalando", 1)
        .expect("Find failed")
        .is_empty());
    assert!(repo
        .find_in_period("zalando", now - Duration::days(1), now)
        .expect("Find failed")
        .is_empty());
    assert_eq!(repo.delete_all().expect("Delete failed"), 0);
}

#[test]
fn test_delete_all_is_idempotent() {
    let (_db, repo) = setup_repository();
    let now = Utc::now();

    repo.save_all(&[snapshot(1, "a", now), snapshot(2, "b", now)])
        .expect("Save failed");

    assert_eq!(repo.delete_all().expect("Delete failed"), 2);
    assert_eq!(repo.delete_all().expect("Delete failed"), 0);
    assert!(repo.find_all().expect("Find failed").is_empty());
}

#[test]
fn test_find_all_ordered_by_key() {
    let (_db, repo) = setup_repository();
    let now = Utc::now();

    repo.save(&snapshot(2, "b", now)).expect("Save failed");
    repo.save(&snapshot(1, "a", now)).expect("Save failed");
    repo.save(&snapshot(1, "a", now - Duration::days(1)))
        .expect("Save failed");

    let keys: Vec<StatisticsKey> = repo
        .find_all()
        .expect("Find failed")
        .iter()
        .map(|s| *s.key())
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn test_unreachable_database_reports_storage_unavailable() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("missing").join("nested").join("catwatch.db");
    let repo = StatisticsRepository::new(Database::new(path.to_str().expect("Invalid path")));

    let err = repo.find_all().expect_err("Find should fail");
    assert_eq!(err.kind, DbErrorKind::StorageUnavailable);

    let err = repo
        .save(&snapshot(1, "zalando", Utc::now()))
        .expect_err("Save should fail");
    assert_eq!(err.kind, DbErrorKind::StorageUnavailable);
}

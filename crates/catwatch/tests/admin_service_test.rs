//! Tests for export, import, wipe and test-data population.

mod common;

use catwatch::{
    AdminService, DatabaseBundle, FormulaScorer, ProjectFilter, RECORDS_PER_SNAPSHOT, SNAPSHOT_DAYS,
    StatisticsRepository,
};

use common::setup_test_db;

fn organizations() -> Vec<String> {
    vec!["zalando".to_string(), "zalando-stups".to_string()]
}

#[test]
fn test_populate_test_data_counts() {
    let (_db, database) = setup_test_db();
    let admin = AdminService::new(database);

    let summary = admin
        .populate_test_data(&organizations())
        .expect("Populate failed");

    let snapshots = usize::try_from(SNAPSHOT_DAYS).expect("small constant") * 2;
    let per_snapshot = usize::try_from(RECORDS_PER_SNAPSHOT).expect("small constant");
    assert_eq!(*summary.statistics(), snapshots);
    assert_eq!(*summary.projects(), snapshots * per_snapshot);
    assert_eq!(*summary.contributors(), snapshots * per_snapshot);
}

#[test]
fn test_populated_latest_snapshot_is_newest() {
    let (_db, database) = setup_test_db();
    let admin = AdminService::new(database.clone());
    admin
        .populate_test_data(&organizations())
        .expect("Populate failed");

    let repo = StatisticsRepository::new(database);
    let all = repo.find_by_organization_name("zalando").expect("Find failed");
    let latest = repo
        .find_latest_by_organization_name("zalando", 1)
        .expect("Find failed");

    let newest = all.iter().filter_map(|s| s.snapshot_date()).max();
    assert_eq!(latest[0].snapshot_date(), newest);
}

#[test]
fn test_export_import_round_trip() {
    let (_source_db, source) = setup_test_db();
    let admin = AdminService::new(source);
    admin
        .populate_test_data(&organizations())
        .expect("Populate failed");
    let exported = admin.export().expect("Export failed");

    let json = serde_json::to_string(&exported).expect("Serialize failed");
    let bundle: DatabaseBundle = serde_json::from_str(&json).expect("Deserialize failed");

    let (_target_db, target) = setup_test_db();
    let target_admin = AdminService::new(target);
    let summary = target_admin.import(&bundle).expect("Import failed");

    assert_eq!(*summary.statistics(), exported.statistics.len());
    assert_eq!(target_admin.export().expect("Export failed"), exported);
}

#[test]
fn test_import_twice_does_not_duplicate() {
    let (_db, database) = setup_test_db();
    let admin = AdminService::new(database);
    admin
        .populate_test_data(&organizations())
        .expect("Populate failed");
    let exported = admin.export().expect("Export failed");

    admin.import(&exported).expect("Import failed");

    assert_eq!(admin.export().expect("Export failed"), exported);
}

#[test]
fn test_delete_all_empties_every_table() {
    let (_db, database) = setup_test_db();
    let admin = AdminService::new(database);
    admin
        .populate_test_data(&organizations())
        .expect("Populate failed");

    let summary = admin.delete_all().expect("Delete failed");
    assert!(*summary.statistics() > 0);

    assert!(admin.export().expect("Export failed").is_empty());
    let again = admin.delete_all().expect("Delete failed");
    assert_eq!(*again.projects(), 0);
}

#[test]
fn test_empty_bundle_json_accepted() {
    let bundle: DatabaseBundle = serde_json::from_str("{}").expect("Deserialize failed");
    assert!(bundle.is_empty());
}

#[test]
fn test_rescore_populated_data() {
    let (_db, database) = setup_test_db();
    let admin = AdminService::new(database);
    admin
        .populate_test_data(&organizations())
        .expect("Populate failed");
    let scorer = FormulaScorer::parse("starsCount + forksCount").expect("Parse failed");

    let report = admin.rescore("zalando", &scorer).expect("Rescore failed");

    let expected = usize::try_from(RECORDS_PER_SNAPSHOT).expect("small constant");
    assert_eq!(*report.updated(), expected);
    let top = admin
        .projects()
        .find_projects("zalando", &ProjectFilter::default().with_limit(1usize))
        .expect("Find failed");
    assert_eq!(top[0].name(), "zalando-project-3");
}

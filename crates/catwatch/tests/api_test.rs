//! Tests for the HTTP surface, driven in-process.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use catwatch::{AdminService, AppState, Database, ORGANIZATIONS_HEADER, Statistics, StatisticsRepository, router};
use chrono::{Duration, SecondsFormat, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use common::setup_test_db;

fn app(database: Database) -> Router {
    router(AppState::new(
        database,
        vec!["zalando".to_string()],
        "starsCount",
    ))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.expect("Request failed");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("Body failed")
        .to_bytes()
        .to_vec();
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Invalid request");
    send(app, request).await
}

fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("Invalid JSON")
}

#[tokio::test]
async fn test_health() {
    let (_db, database) = setup_test_db();
    let (status, body) = get(app(database), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_latest_statistics_default_organization() {
    let (_db, database) = setup_test_db();
    let repo = StatisticsRepository::new(database.clone());
    let now = Utc::now();
    repo.save(
        &Statistics::new(1, now - Duration::days(1))
            .with_organization_name("zalando")
            .with_members_count(1),
    )
    .expect("Save failed");
    repo.save(
        &Statistics::new(1, now)
            .with_organization_name("zalando")
            .with_members_count(2),
    )
    .expect("Save failed");

    let (status, body) = get(app(database), "/api/statistics").await;

    assert_eq!(status, StatusCode::OK);
    let value = json(&body);
    let items = value.as_array().expect("Expected array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], 1);
    assert_eq!(items[0]["organizationName"], "zalando");
    assert_eq!(items[0]["membersCount"], 2);
    assert!(items[0]["teamsCount"].is_null());
}

#[tokio::test]
async fn test_statistics_in_period() {
    let (_db, database) = setup_test_db();
    let repo = StatisticsRepository::new(database.clone());
    let now = Utc::now();
    for days in [1, 2, 3] {
        repo.save(&Statistics::new(7, now - Duration::days(days)).with_organization_name("acme"))
            .expect("Save failed");
    }

    let start = (now - Duration::days(2)).to_rfc3339_opts(SecondsFormat::Millis, true);
    let end = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let uri = format!(
        "/api/statistics?organizations=acme&startDate={}&endDate={}",
        start, end
    );
    let (status, body) = get(app(database), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body).as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_statistics_with_one_date_rejected() {
    let (_db, database) = setup_test_db();
    let start = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    let (status, body) = get(app(database), &format!("/api/statistics?startDate={}", start)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].is_string());
}

#[tokio::test]
async fn test_init_then_export_and_delete() {
    let (_db, database) = setup_test_db();

    let (status, body) = get(app(database.clone()), "/init").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    let (status, body) = get(app(database.clone()), "/export").await;
    assert_eq!(status, StatusCode::OK);
    let bundle = json(&body);
    assert!(!bundle["statistics"].as_array().expect("Expected array").is_empty());
    assert!(!bundle["projects"].as_array().expect("Expected array").is_empty());

    let (status, _) = get(app(database.clone()), "/delete").await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(app(database), "/api/statistics").await;
    assert_eq!(json(&body), serde_json::json!([]));
}

#[tokio::test]
async fn test_import_bundle() {
    let (_db, database) = setup_test_db();
    let bundle = serde_json::json!({
        "statistics": [{
            "id": 3,
            "snapshotDate": "2024-05-01T10:00:00.123Z",
            "organizationName": "zalando",
            "allStarsCount": 99
        }]
    });
    let request = Request::builder()
        .method("POST")
        .uri("/import")
        .header("content-type", "application/json")
        .body(Body::from(bundle.to_string()))
        .expect("Invalid request");

    let (status, body) = send(app(database.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    let stored = StatisticsRepository::new(database)
        .find_by_organization_name("zalando")
        .expect("Find failed");
    assert_eq!(stored.len(), 1);
    assert_eq!(*stored[0].all_stars_count(), Some(99));
    assert_eq!(*stored[0].members_count(), None);
}

#[tokio::test]
async fn test_rescore_endpoint() {
    let (_db, database) = setup_test_db();
    get(app(database.clone()), "/init").await;

    let request = Request::builder()
        .method("POST")
        .uri("/config/scoring.project")
        .header(ORGANIZATIONS_HEADER, "zalando")
        .body(Body::from("starsCount * 2"))
        .expect("Invalid request");
    let (status, body) = send(app(database.clone()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!(["3 project object(s) updated"]));

    let (_, body) = get(app(database), "/api/projects?organizations=zalando&limit=1").await;
    let projects = json(&body);
    assert_eq!(projects.as_array().map(Vec::len), Some(1));
    assert!(projects[0]["score"].is_number());
}

#[tokio::test]
async fn test_rescore_with_invalid_formula() {
    let (_db, database) = setup_test_db();
    let request = Request::builder()
        .method("POST")
        .uri("/config/scoring.project")
        .body(Body::from("watchersCount +"))
        .expect("Invalid request");

    let (status, _) = send(app(database), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_contributors_endpoint() {
    let (_db, database) = setup_test_db();
    get(app(database.clone()), "/init").await;

    let (status, body) = get(app(database), "/api/contributors?organizations=zalando").await;

    assert_eq!(status, StatusCode::OK);
    let contributors = json(&body);
    let items = contributors.as_array().expect("Expected array");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["name"], "contributor-3");
}

#[tokio::test]
async fn test_unreachable_database_returns_service_unavailable() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("missing").join("catwatch.db");
    let database = Database::new(path.to_str().expect("Invalid path"));

    let (status, body) = get(app(database), "/api/statistics").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json(&body)["error"].is_string());
}

#[tokio::test]
async fn test_projects_language_and_sort_parameters() {
    let (_db, database) = setup_test_db();
    get(app(database.clone()), "/init").await;

    let (status, body) = get(
        app(database.clone()),
        "/api/projects?organizations=zalando&language=Rust&sortBy=stars",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let projects = json(&body);
    let items = projects.as_array().expect("Expected array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["primaryLanguage"], "Rust");

    let (status, body) = get(app(database.clone()), "/api/projects?q=project-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)[0]["name"], "zalando-project-3");

    let (status, _) = get(app(database), "/api/projects?sortBy=watchers").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_projects_limit_spans_organizations() {
    let (_db, database) = setup_test_db();
    AdminService::new(database.clone())
        .populate_test_data(&["a".to_string(), "b".to_string()])
        .expect("Populate failed");

    let (status, body) = get(app(database), "/api/projects?organizations=a,b&limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body).as_array().map(Vec::len), Some(2));
}

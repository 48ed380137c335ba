//! REST surface served with axum.

mod admin;
mod error;
mod handlers;

pub use admin::ORGANIZATIONS_HEADER;
pub use error::ApiError;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{info, instrument};

use crate::admin::AdminService;
use crate::db::{ContributorRepository, Database, DbError, StatisticsRepository};
use crate::statistics_service::StatisticsService;

/// Shared state of every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    statistics: StatisticsService,
    contributors: ContributorRepository,
    admin: AdminService,
    organizations: Arc<[String]>,
    scoring_formula: Arc<str>,
}

impl AppState {
    /// Builds the state over `database`.
    ///
    /// `organizations` are served when a request names none; `scoring_formula`
    /// is used when a rescoring request carries none.
    #[instrument(skip(database), fields(url = %database.url()))]
    pub fn new(database: Database, organizations: Vec<String>, scoring_formula: &str) -> Self {
        Self {
            statistics: StatisticsService::new(StatisticsRepository::new(database.clone())),
            contributors: ContributorRepository::new(database.clone()),
            admin: AdminService::new(database),
            organizations: organizations.into(),
            scoring_formula: scoring_formula.into(),
        }
    }

    /// Returns the statistics read model.
    pub fn statistics(&self) -> &StatisticsService {
        &self.statistics
    }

    /// Returns the contributor store.
    pub fn contributors(&self) -> &ContributorRepository {
        &self.contributors
    }

    /// Returns the admin service.
    pub fn admin(&self) -> &AdminService {
        &self.admin
    }

    /// Returns the default organizations.
    pub fn organizations(&self) -> &[String] {
        &self.organizations
    }

    /// Returns the default scoring formula.
    pub fn scoring_formula(&self) -> &str {
        &self.scoring_formula
    }
}

/// Runs a store operation on the blocking thread pool.
async fn blocking<T, F>(operation: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, DbError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// Builds the application router with request logging.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/statistics", get(handlers::statistics))
        .route("/api/projects", get(handlers::projects))
        .route("/api/contributors", get(handlers::contributors))
        .route("/config/scoring.project", post(admin::score_projects))
        .route("/init", get(admin::init))
        .route("/delete", get(admin::delete))
        .route("/import", post(admin::import))
        .route("/export", get(admin::export))
        .route("/health", get(handlers::health))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}

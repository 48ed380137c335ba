//! Administrative endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use tracing::{info, instrument};

use super::{ApiError, AppState, blocking};
use crate::admin::DatabaseBundle;
use crate::scoring::FormulaScorer;

/// Header naming the organizations to rescore.
pub const ORGANIZATIONS_HEADER: &str = "x-organizations";

/// `POST /config/scoring.project`
///
/// The body, if not blank, is the scoring formula; otherwise the configured
/// one is used.
#[instrument(skip(state, headers, body))]
pub async fn score_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Vec<String>>, ApiError> {
    let formula = if body.trim().is_empty() {
        state.scoring_formula().to_string()
    } else {
        body
    };
    let scorer = FormulaScorer::parse(&formula)?;

    let organizations = match headers.get(ORGANIZATIONS_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|e| ApiError::BadRequest(format!("Invalid {} header: {}", ORGANIZATIONS_HEADER, e)))?
            .to_string(),
        None => state.organizations().join(","),
    };
    info!(organizations = %organizations, formula = %scorer.source(), "Rescoring projects");

    let admin = state.admin().clone();
    let report = blocking(move || admin.rescore(&organizations, &scorer)).await?;
    Ok(Json(report.into_messages()))
}

/// `GET /init`
#[instrument(skip(state))]
pub async fn init(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    let admin = state.admin().clone();
    let organizations = state.organizations().to_vec();
    let summary = blocking(move || admin.populate_test_data(&organizations)).await?;
    info!(?summary, "Test data populated");
    Ok("OK")
}

/// `GET /delete`
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    let admin = state.admin().clone();
    blocking(move || admin.delete_all()).await?;
    Ok("OK")
}

/// `POST /import`
#[instrument(skip(state, bundle))]
pub async fn import(
    State(state): State<AppState>,
    Json(bundle): Json<DatabaseBundle>,
) -> Result<&'static str, ApiError> {
    let admin = state.admin().clone();
    blocking(move || admin.import(&bundle)).await?;
    Ok("OK")
}

/// `GET /export`
#[instrument(skip(state))]
pub async fn export(State(state): State<AppState>) -> Result<Json<DatabaseBundle>, ApiError> {
    let admin = state.admin().clone();
    let bundle = blocking(move || admin.export()).await?;
    Ok(Json(bundle))
}

//! Read endpoints under `/api`.

use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::{debug, instrument};

use super::{ApiError, AppState, blocking};
use crate::config::split_organizations;
use crate::db::{Contributor, Project, ProjectFilter, ProjectSort, Statistics};

/// Query of `GET /api/statistics`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsQuery {
    organizations: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

/// Query of `GET /api/projects`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectQuery {
    organizations: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    sort_by: Option<String>,
    #[serde(alias = "q")]
    query: Option<String>,
    language: Option<String>,
}

impl ProjectQuery {
    fn filter(&self) -> Result<ProjectFilter, ApiError> {
        let sort_by = match self.sort_by.as_deref() {
            None | Some("") => ProjectSort::default(),
            Some(value) => ProjectSort::from_str(value).map_err(|_| {
                let allowed: Vec<String> = ProjectSort::iter().map(|s| s.to_string()).collect();
                ApiError::BadRequest(format!(
                    "unknown sortBy '{}', expected one of {}",
                    value,
                    allowed.join(", ")
                ))
            })?,
        };

        let mut filter = ProjectFilter::default().with_sort_by(sort_by);
        filter = filter.with_limit(self.limit).with_offset(self.offset);
        filter = filter.with_start_date(self.start_date).with_end_date(self.end_date);
        filter = filter.with_query(self.query.clone()).with_language(self.language.clone());
        Ok(filter)
    }
}

/// Query of `GET /api/contributors`.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    organizations: Option<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

/// Resolves the requested organizations, falling back to the configured ones.
fn organizations(state: &AppState, requested: Option<&str>) -> Vec<String> {
    let requested = requested.map(split_organizations).unwrap_or_default();
    if requested.is_empty() {
        state.organizations().to_vec()
    } else {
        requested
    }
}

/// `GET /api/statistics`
#[instrument(skip(state))]
pub async fn statistics(
    State(state): State<AppState>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Vec<Statistics>>, ApiError> {
    let organizations = organizations(&state, query.organizations.as_deref());
    let service = state.statistics().clone();

    let result = match (query.start_date, query.end_date) {
        (None, None) => blocking(move || service.latest(&organizations)).await?,
        (Some(start), Some(end)) => {
            blocking(move || service.in_period(&organizations, start, end)).await?
        }
        _ => {
            return Err(ApiError::BadRequest(
                "startDate and endDate must be given together".to_string(),
            ));
        }
    };

    debug!(count = result.len(), "Statistics served");
    Ok(Json(result))
}

/// `GET /api/projects`
///
/// Ordering, offset and limit apply to the listing merged across the
/// requested organizations.
#[instrument(skip(state))]
pub async fn projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<Vec<Project>>, ApiError> {
    let organizations = organizations(&state, query.organizations.as_deref());
    let filter = query.filter()?;
    let repository = state.admin().projects().clone();

    let result = blocking(move || repository.find_projects_in(&organizations, &filter)).await?;

    debug!(count = result.len(), "Projects served");
    Ok(Json(result))
}

/// `GET /api/contributors`
///
/// Offset and limit apply to the listing merged across the requested
/// organizations.
#[instrument(skip(state))]
pub async fn contributors(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Vec<Contributor>>, ApiError> {
    let organizations = organizations(&state, query.organizations.as_deref());
    let repository = state.contributors().clone();

    let result = blocking(move || {
        repository.find_contributors_in(&organizations, query.limit, query.offset)
    })
    .await?;

    debug!(count = result.len(), "Contributors served");
    Ok(Json(result))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

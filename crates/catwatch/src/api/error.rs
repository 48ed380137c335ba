//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Display, From};
use serde_json::json;
use tracing::{error, warn};

use crate::db::{DbError, DbErrorKind};
use crate::scoring::ScoringError;

/// Failure of a request handler.
#[derive(Debug, Display, From)]
pub enum ApiError {
    /// The store rejected or failed the operation.
    #[display("{}", _0)]
    Db(DbError),
    /// The scoring formula could not be parsed.
    #[display("{}", _0)]
    Scoring(ScoringError),
    /// The request itself is malformed.
    #[display("bad request: {}", _0)]
    #[from(ignore)]
    BadRequest(String),
    /// The blocking worker running the operation failed.
    #[display("internal error: {}", _0)]
    #[from(ignore)]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Db(err) => match err.kind {
                DbErrorKind::Validation => StatusCode::BAD_REQUEST,
                DbErrorKind::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                DbErrorKind::DuplicateKeyConflict | DbErrorKind::Query => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Scoring(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Db(err) => err.message.clone(),
            Self::Scoring(err) => err.message.clone(),
            Self::BadRequest(message) | Self::Internal(message) => message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = %status, "Request failed");
        } else {
            warn!(error = %self, status = %status, "Request rejected");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

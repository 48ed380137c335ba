//! Scoring error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Scoring error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Scoring error: {} at {}:{}", message, file, line)]
pub struct ScoringError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ScoringError {
    /// Creates a new scoring error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

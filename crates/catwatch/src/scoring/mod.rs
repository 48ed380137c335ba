//! Project scoring: formulas and the scoring pass.

mod error;
mod formula;
mod pass;

pub use error::ScoringError;
pub use formula::{FormulaScorer, ProjectField, Scorer};
pub use pass::{MAX_SCORING_ERRORS, ScoreReport, ScoringPass, TRUNCATION_NOTICE};

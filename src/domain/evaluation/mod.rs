//! Evaluation domain module.
//!
//! The scored outcome of a session and the snapshot sent to the scorer.
//! The scoring algorithm itself lives outside this crate.

mod metrics;
mod request;

pub use metrics::{EvaluationMetrics, EvaluationMetricsBuilder, RubricScores, SpeechMetrics};
pub use request::{ScoringRequest, SpeechTiming};

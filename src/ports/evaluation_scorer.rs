//! Evaluation Scorer Port - Interface to the external scoring function.
//!
//! The scorer is a black box: it receives the full message log with
//! speech-timing metadata and returns [`EvaluationMetrics`]. Numeric ranges
//! in the response are neither validated nor clamped.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::evaluation::{EvaluationMetrics, ScoringRequest};
use crate::domain::foundation::SessionContext;

/// Port for producing evaluation metrics from a finished conversation.
///
/// Scoring is assumed expensive and non-idempotent; callers must not invoke
/// it again for a session that already holds metrics.
#[async_trait]
pub trait EvaluationScorer: Send + Sync {
    async fn score(
        &self,
        ctx: &SessionContext,
        request: &ScoringRequest,
    ) -> Result<EvaluationMetrics, ScoringError>;
}

/// Errors from the scoring service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("scoring timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("scoring service unavailable: {0}")]
    Unavailable(String),

    #[error("invalid scoring response: {0}")]
    InvalidResponse(String),

    #[error("scoring request rejected: not authorized")]
    Unauthorized,
}


//! Evaluation Store Port - Persistence of evaluation metrics.
//!
//! Metrics are saved against the persisted session record identified by a
//! [`UserSessionId`].
//!
//! # Contract
//!
//! `save` is an upsert. Retrying with the same id and metrics must leave a
//! single record, never a duplicate.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::evaluation::EvaluationMetrics;
use crate::domain::foundation::{SessionContext, UserSessionId};

#[async_trait]
pub trait EvaluationStore: Send + Sync {
    /// Inserts or replaces the metrics for `user_session_id`.
    async fn save(
        &self,
        ctx: &SessionContext,
        user_session_id: UserSessionId,
        metrics: &EvaluationMetrics,
    ) -> Result<(), StoreError>;
}

/// Errors from session and evaluation persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("session record not found: {0}")]
    NotFound(UserSessionId),

    #[error("persistence timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("not authorized to write session records")]
    Unauthorized,
}

impl StoreError {
    pub fn database(err: impl std::fmt::Display) -> Self {
        StoreError::Database(err.to_string())
    }
}


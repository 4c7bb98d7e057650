//! PostgreSQL implementation of SessionRecorder and EvaluationStore.
//!
//! Session rows live in `user_sessions`; evaluations in
//! `session_evaluations`, one row per session, keyed by the session id so
//! that repeated saves upsert.

use async_trait::async_trait;
use sqlx::{Executor, PgPool};

use crate::domain::evaluation::EvaluationMetrics;
use crate::domain::foundation::{SessionContext, Timestamp, UserSessionId};
use crate::ports::{EvaluationStore, SessionRecorder, StoreError};

/// Tables used by [`PostgresSessionStore`].
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS user_sessions (
    id          UUID PRIMARY KEY,
    user_id     TEXT NOT NULL,
    started_at  TIMESTAMPTZ NOT NULL,
    reflection  TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS session_evaluations (
    user_session_id UUID PRIMARY KEY REFERENCES user_sessions (id) ON DELETE CASCADE,
    metrics         JSONB NOT NULL,
    updated_at      TIMESTAMPTZ NOT NULL
);
"#;

/// Postgres error code for a violated foreign key.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the tables if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.pool
            .execute(SCHEMA)
            .await
            .map_err(|e| StoreError::database(format!("Failed to create schema: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl SessionRecorder for PostgresSessionStore {
    async fn create(
        &self,
        ctx: &SessionContext,
        started_at: Timestamp,
    ) -> Result<UserSessionId, StoreError> {
        let id = UserSessionId::new();

        sqlx::query(
            r#"
            INSERT INTO user_sessions (id, user_id, started_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id.as_uuid())
        .bind(ctx.user_id().as_str())
        .bind(started_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to insert session: {}", e)))?;

        Ok(id)
    }

    async fn save_reflection(
        &self,
        _ctx: &SessionContext,
        user_session_id: UserSessionId,
        reflection: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE user_sessions SET reflection = $2 WHERE id = $1")
            .bind(user_session_id.as_uuid())
            .bind(reflection)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::database(format!("Failed to save reflection: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(user_session_id));
        }

        Ok(())
    }
}

#[async_trait]
impl EvaluationStore for PostgresSessionStore {
    async fn save(
        &self,
        _ctx: &SessionContext,
        user_session_id: UserSessionId,
        metrics: &EvaluationMetrics,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(metrics)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO session_evaluations (user_session_id, metrics, updated_at)
            VALUES ($1, $2::jsonb, $3)
            ON CONFLICT (user_session_id) DO UPDATE SET
                metrics = EXCLUDED.metrics,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_session_id.as_uuid())
        .bind(json)
        .bind(Timestamp::now().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| map_save_error(e, user_session_id))?;

        Ok(())
    }
}

fn map_save_error(err: sqlx::Error, user_session_id: UserSessionId) -> StoreError {
    let is_missing_parent = err
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == FOREIGN_KEY_VIOLATION)
        .unwrap_or(false);

    if is_missing_parent {
        StoreError::NotFound(user_session_id)
    } else {
        StoreError::database(format!("Failed to save evaluation: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_keys_evaluations_by_session() {
        assert!(SCHEMA.contains("user_session_id UUID PRIMARY KEY"));
        assert!(SCHEMA.contains("CREATE TABLE IF NOT EXISTS user_sessions"));
    }

    #[test]
    fn non_database_errors_map_to_database_failure() {
        let id = UserSessionId::new();
        let err = map_save_error(sqlx::Error::PoolTimedOut, id);
        assert!(matches!(err, StoreError::Database(msg) if msg.contains("Failed to save evaluation")));
    }
}

//! In-Memory Session Store Adapter
//!
//! Implements both [`SessionRecorder`] and [`EvaluationStore`] over shared
//! maps. Used by tests and by the replay binary when no database is
//! configured. Failures can be injected per operation and every evaluation
//! save is recorded for assertions.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;

use crate::domain::evaluation::EvaluationMetrics;
use crate::domain::foundation::{SessionContext, Timestamp, UserId, UserSessionId};
use crate::ports::{EvaluationStore, SessionRecorder, StoreError};

/// A persisted session row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub user_id: UserId,
    pub started_at: Timestamp,
    pub reflection: Option<String>,
    pub evaluation: Option<EvaluationMetrics>,
}

/// In-memory session and evaluation storage.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    records: Arc<RwLock<HashMap<UserSessionId, StoredSession>>>,
    create_failures: Arc<Mutex<VecDeque<StoreError>>>,
    save_failures: Arc<Mutex<VecDeque<StoreError>>>,
    save_calls: Arc<Mutex<Vec<(UserSessionId, EvaluationMetrics)>>>,
    save_delay: Duration,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `create` calls fail, in order.
    pub fn fail_next_create(self, error: StoreError) -> Self {
        self.create_failures.lock().unwrap().push_back(error);
        self
    }

    /// Makes the next `save` calls fail, in order.
    pub fn fail_next_save(self, error: StoreError) -> Self {
        self.save_failures.lock().unwrap().push_back(error);
        self
    }

    /// Delays every evaluation save.
    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = delay;
        self
    }

    pub async fn get(&self, id: UserSessionId) -> Option<StoredSession> {
        self.records.read().await.get(&id).cloned()
    }

    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Number of stored evaluations, one per session row at most.
    pub async fn evaluation_count(&self) -> usize {
        self.records
            .read()
            .await
            .values()
            .filter(|r| r.evaluation.is_some())
            .count()
    }

    /// Every `save` call including failed ones.
    pub fn save_calls(&self) -> Vec<(UserSessionId, EvaluationMetrics)> {
        self.save_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionRecorder for InMemorySessionStore {
    async fn create(
        &self,
        ctx: &SessionContext,
        started_at: Timestamp,
    ) -> Result<UserSessionId, StoreError> {
        if let Some(err) = self.create_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let id = UserSessionId::new();
        self.records.write().await.insert(
            id,
            StoredSession {
                user_id: ctx.user_id().clone(),
                started_at,
                reflection: None,
                evaluation: None,
            },
        );
        Ok(id)
    }

    async fn save_reflection(
        &self,
        _ctx: &SessionContext,
        user_session_id: UserSessionId,
        reflection: &str,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&user_session_id)
            .ok_or(StoreError::NotFound(user_session_id))?;
        record.reflection = Some(reflection.to_string());
        Ok(())
    }
}

#[async_trait]
impl EvaluationStore for InMemorySessionStore {
    async fn save(
        &self,
        _ctx: &SessionContext,
        user_session_id: UserSessionId,
        metrics: &EvaluationMetrics,
    ) -> Result<(), StoreError> {
        self.save_calls
            .lock()
            .unwrap()
            .push((user_session_id, metrics.clone()));

        if !self.save_delay.is_zero() {
            sleep(self.save_delay).await;
        }

        if let Some(err) = self.save_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let mut records = self.records.write().await;
        let record = records
            .get_mut(&user_session_id)
            .ok_or(StoreError::NotFound(user_session_id))?;
        record.evaluation = Some(metrics.clone());
        Ok(())
    }
}

//! Session Recorder Port - Creates the persisted session row.
//!
//! Every connected conversation gets one record. Its id keys the evaluation
//! and the user's post-session reflection.

use async_trait::async_trait;

use crate::domain::foundation::{SessionContext, Timestamp, UserSessionId};

use super::StoreError;

#[async_trait]
pub trait SessionRecorder: Send + Sync {
    /// Creates a session record for the context's user and returns its id.
    async fn create(
        &self,
        ctx: &SessionContext,
        started_at: Timestamp,
    ) -> Result<UserSessionId, StoreError>;

    /// Attaches the user's reflection text to an existing record.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record exists for `user_session_id`
    async fn save_reflection(
        &self,
        ctx: &SessionContext,
        user_session_id: UserSessionId,
        reflection: &str,
    ) -> Result<(), StoreError>;
}

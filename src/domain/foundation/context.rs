//! Per-session credential context.
//!
//! Each conversation runtime owns one `SessionContext` and passes it to every
//! port call. There is no process-wide "current user" or token: two sessions
//! in the same process carry independent contexts.

use secrecy::{ExposeSecret, Secret};

use super::UserId;

/// Identity and credential for calls made on behalf of one signed-in user.
#[derive(Clone)]
pub struct SessionContext {
    user_id: UserId,
    access_token: Secret<String>,
}

impl SessionContext {
    /// Creates a context at sign-in.
    pub fn new(user_id: UserId, access_token: impl Into<String>) -> Self {
        Self {
            user_id,
            access_token: Secret::new(access_token.into()),
        }
    }

    /// Creates a context from a token that is already held as a secret.
    pub fn from_secret(user_id: UserId, access_token: Secret<String>) -> Self {
        Self {
            user_id,
            access_token,
        }
    }

    /// Returns the signed-in user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Exposes the bearer token for an outbound request.
    pub fn bearer_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

//! Voice Transport Port - Interface to the speech-to-speech service.
//!
//! The transport carries the live audio conversation. The session core only
//! sees its lifecycle: a begin command, an end command, and a stream of
//! callbacks (connected, raw message payloads, content-policy trips,
//! failures) delivered to a [`TransportListener`].
//!
//! # Contract
//!
//! Implementations must:
//! - Call [`TransportListener::connected`] at most once per `begin`
//! - Deliver message payloads in arrival order
//! - Stop calling the listener once `end` has returned

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::conversation::RawPayload;
use crate::domain::foundation::SessionContext;

/// Port for the third-party voice conversation service.
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    /// Opens a conversation and starts delivering callbacks to `listener`.
    ///
    /// Returning `Ok` means the request was accepted, not that the
    /// connection is up; that is signalled through the listener.
    async fn begin(
        &self,
        ctx: &SessionContext,
        listener: Arc<dyn TransportListener>,
    ) -> Result<(), TransportError>;

    /// Closes the conversation. Ending an already-closed transport is a no-op.
    async fn end(&self) -> Result<(), TransportError>;
}

/// Receives transport callbacks.
///
/// Callbacks are synchronous and must not block; implementations queue them.
pub trait TransportListener: Send + Sync {
    fn connected(&self);

    fn message(&self, raw: RawPayload);

    /// Content-policy trip reported by the service.
    fn censored(&self);

    fn failed(&self, reason: String);
}

/// Errors reported by a voice transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("transport closed: {0}")]
    Closed(String),

    #[error("credentials rejected by voice service")]
    Unauthorized,
}


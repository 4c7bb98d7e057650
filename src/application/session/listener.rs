//! Bridges transport callbacks into the session queue.

use tokio::sync::mpsc::WeakUnboundedSender;

use crate::domain::conversation::RawPayload;
use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::session::SessionEvent;
use crate::ports::TransportListener;

use super::runtime::Command;

/// Forwards transport callbacks as events tagged with the session they
/// were opened for. Holds only a weak sender, so an open transport never
/// keeps a finished runtime alive.
pub(crate) struct QueueListener {
    origin: SessionId,
    queue: WeakUnboundedSender<Command>,
}

impl QueueListener {
    pub(crate) fn new(origin: SessionId, queue: WeakUnboundedSender<Command>) -> Self {
        Self { origin, queue }
    }

    fn forward(&self, event: SessionEvent) {
        match self.queue.upgrade() {
            Some(tx) => {
                let _ = tx.send(Command::feedback(self.origin, event));
            }
            None => tracing::debug!(session_id = %self.origin, "transport callback after runtime stopped"),
        }
    }
}

impl TransportListener for QueueListener {
    fn connected(&self) {
        self.forward(SessionEvent::TransportConnected { at: Timestamp::now() });
    }

    fn message(&self, raw: RawPayload) {
        self.forward(SessionEvent::MessageReceived {
            raw,
            received_at: Timestamp::now(),
        });
    }

    fn censored(&self) {
        self.forward(SessionEvent::CensorshipFlagged);
    }

    fn failed(&self, reason: String) {
        self.forward(SessionEvent::TransportFailed(reason));
    }
}

//! Scripted voice transport for tests and payload replay.
//!
//! On `begin` the transport plays its script into the listener, in order.
//! Tests can keep pushing steps afterwards with [`ScriptedTransport::emit`]
//! until `end` is called, after which the listener is dropped and further
//! steps go nowhere.
//!
//! # Example
//!
//! ```ignore
//! let transport = ScriptedTransport::new()
//!     .with_step(TransportStep::Connect)
//!     .with_step(TransportStep::Message("<Coach>Hello</Coach>".into()));
//!
//! transport.begin(&ctx, listener).await?;
//! transport.emit(TransportStep::Message("Hi there".into()));
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::domain::conversation::RawPayload;
use crate::domain::foundation::SessionContext;
use crate::ports::{TransportError, TransportListener, VoiceTransport};

/// One callback the transport will deliver.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportStep {
    Connect,
    Message(RawPayload),
    Censor,
    Fail(String),
}

impl TransportStep {
    fn deliver(self, listener: &dyn TransportListener) {
        match self {
            TransportStep::Connect => listener.connected(),
            TransportStep::Message(raw) => listener.message(raw),
            TransportStep::Censor => listener.censored(),
            TransportStep::Fail(reason) => listener.failed(reason),
        }
    }
}

#[derive(Default)]
struct TransportState {
    script: Vec<TransportStep>,
    listener: Option<Arc<dyn TransportListener>>,
    begin_error: Option<TransportError>,
    begin_calls: usize,
    end_calls: usize,
}

/// In-process transport driven by a script.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<TransportState>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step to play on `begin`.
    pub fn with_step(self, step: TransportStep) -> Self {
        self.state.lock().unwrap().script.push(step);
        self
    }

    /// Makes the next `begin` fail.
    pub fn with_begin_error(self, error: TransportError) -> Self {
        self.state.lock().unwrap().begin_error = Some(error);
        self
    }

    /// Delivers a step to the open listener.
    ///
    /// Returns `false` when no conversation is open.
    pub fn emit(&self, step: TransportStep) -> bool {
        let listener = self.state.lock().unwrap().listener.clone();
        match listener {
            Some(listener) => {
                step.deliver(listener.as_ref());
                true
            }
            None => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().unwrap().listener.is_some()
    }

    pub fn begin_calls(&self) -> usize {
        self.state.lock().unwrap().begin_calls
    }

    pub fn end_calls(&self) -> usize {
        self.state.lock().unwrap().end_calls
    }
}

#[async_trait]
impl VoiceTransport for ScriptedTransport {
    async fn begin(
        &self,
        _ctx: &SessionContext,
        listener: Arc<dyn TransportListener>,
    ) -> Result<(), TransportError> {
        let script = {
            let mut state = self.state.lock().unwrap();
            state.begin_calls += 1;
            if let Some(err) = state.begin_error.take() {
                return Err(err);
            }
            state.listener = Some(Arc::clone(&listener));
            std::mem::take(&mut state.script)
        };

        for step in script {
            step.deliver(listener.as_ref());
        }
        Ok(())
    }

    async fn end(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        state.end_calls += 1;
        state.listener = None;
        Ok(())
    }
}

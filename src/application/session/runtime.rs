//! Session runtime - the single owner of one conversation.
//!
//! The runtime owns a [`ConversationSession`] and its [`ConversationTimer`]
//! and processes commands from one queue, one at a time. Effects returned by
//! a transition are executed here: quick ones inline (timer), I/O in
//! spawned tasks whose results re-enter the queue as events.
//!
//! Every fed-back event is tagged with the id of the session that issued
//! it. After a reset or restart the session id changes, so late results
//! from the previous conversation are dropped instead of leaking into the
//! new one.
//!
//! Scoring and persistence calls are bounded by timeouts; an expired call
//! arrives as the corresponding failure event.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::sync::oneshot;
use tokio::time::{timeout, Instant};
use tracing::{debug, error, info, warn};

use crate::application::supervisor::{Supervisor, TranscriptExporter};
use crate::application::timer::ConversationTimer;
use crate::config::SessionConfig;
use crate::domain::foundation::{SessionContext, SessionId, Timestamp};
use crate::domain::session::{
    ConversationSession, SessionEffect, SessionError, SessionEvent, SessionView,
};
use crate::ports::{
    EvaluationScorer, EvaluationStore, PermissionSource, ScoringError, SessionRecorder,
    StoreError, TransportListener, VoiceTransport,
};

use super::listener::QueueListener;

/// External collaborators of one session.
#[derive(Clone)]
pub struct SessionServices {
    pub transport: Arc<dyn VoiceTransport>,
    pub permission: Arc<dyn PermissionSource>,
    pub scorer: Arc<dyn EvaluationScorer>,
    pub recorder: Arc<dyn SessionRecorder>,
    pub store: Arc<dyn EvaluationStore>,
    pub exporter: Arc<Supervisor<TranscriptExporter>>,
}

/// Timing used by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub time_limit_warning: Duration,
    pub scoring_timeout: Duration,
    pub persistence_timeout: Duration,
}

impl From<&SessionConfig> for RuntimeSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            time_limit_warning: config.time_limit_warning(),
            scoring_timeout: config.scoring_timeout(),
            persistence_timeout: config.persistence_timeout(),
        }
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

type Reply<T> = oneshot::Sender<T>;

pub(crate) enum Command {
    Start {
        reply: Reply<Result<(), SessionError>>,
    },
    Event {
        /// Session that issued the effect this event answers; `None` for
        /// caller-issued events.
        origin: Option<SessionId>,
        event: SessionEvent,
        reply: Option<Reply<Result<(), SessionError>>>,
    },
    Snapshot {
        reply: Reply<SessionView>,
    },
    Shutdown {
        reply: Reply<()>,
    },
}

impl Command {
    pub(crate) fn feedback(origin: SessionId, event: SessionEvent) -> Self {
        Command::Event {
            origin: Some(origin),
            event,
            reply: None,
        }
    }
}

fn feed(queue: &WeakUnboundedSender<Command>, origin: SessionId, event: SessionEvent) {
    if let Some(tx) = queue.upgrade() {
        let _ = tx.send(Command::feedback(origin, event));
    }
}

/// Owns one conversation session and executes its effects.
pub struct SessionRuntime {
    session: ConversationSession,
    ctx: Arc<SessionContext>,
    services: SessionServices,
    settings: RuntimeSettings,
    timer: ConversationTimer,
    queue: WeakUnboundedSender<Command>,
}

impl SessionRuntime {
    /// Starts the runtime task and returns a handle to it.
    ///
    /// The task stops on [`SessionHandle::shutdown`] or once every handle
    /// has been dropped.
    pub fn spawn(
        ctx: SessionContext,
        services: SessionServices,
        settings: RuntimeSettings,
    ) -> SessionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let runtime = SessionRuntime {
            session: ConversationSession::new(ctx.user_id().clone()),
            ctx: Arc::new(ctx),
            services,
            settings,
            timer: ConversationTimer::new(settings.time_limit_warning),
            queue: tx.downgrade(),
        };
        tokio::spawn(runtime.run(rx));
        SessionHandle { tx }
    }

    async fn run(mut self, mut rx: UnboundedReceiver<Command>) {
        info!(
            session_id = %self.session.id(),
            user_id = %self.ctx.user_id(),
            "session runtime started"
        );

        while let Some(command) = rx.recv().await {
            match command {
                Command::Start { reply } => {
                    let has_permission = self.services.permission.has_permission().await;
                    let _ = reply.send(self.dispatch(SessionEvent::RequestStart { has_permission }));
                }
                Command::Event {
                    origin,
                    event,
                    reply,
                } => {
                    let result = match origin {
                        Some(origin) if origin != *self.session.id() => {
                            debug!(
                                session_id = %self.session.id(),
                                stale_session_id = %origin,
                                event = event.name(),
                                "dropping result for previous session"
                            );
                            Ok(())
                        }
                        None if !event.is_caller_issued() => {
                            warn!(
                                session_id = %self.session.id(),
                                event = event.name(),
                                "caller tried to report a collaborator result"
                            );
                            Err(SessionError::NotUserAction(event.name()))
                        }
                        _ => self.dispatch(event),
                    };
                    if let Some(reply) = reply {
                        let _ = reply.send(result);
                    }
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.session.view());
                }
                Command::Shutdown { reply } => {
                    self.close().await;
                    let _ = reply.send(());
                    return;
                }
            }
        }

        self.close().await;
    }

    /// Applies one event and executes the resulting effects.
    fn dispatch(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        let name = event.name();
        let before = self.session.phase();

        let effects = match self.session.apply(event) {
            Ok(effects) => effects,
            Err(err) => {
                warn!(
                    session_id = %self.session.id(),
                    event = name,
                    phase = %before,
                    error = %err,
                    "event rejected"
                );
                return Err(err);
            }
        };

        let after = self.session.phase();
        match self.session.error() {
            Some(err) if after != before && err.code().is_fatal() => error!(
                session_id = %self.session.id(),
                event = name,
                from = %before,
                to = %after,
                error = %err,
                "session failed"
            ),
            _ if after != before => info!(
                session_id = %self.session.id(),
                event = name,
                from = %before,
                to = %after,
                "session transition"
            ),
            _ => debug!(session_id = %self.session.id(), event = name, phase = %after, "event applied"),
        }

        for effect in effects {
            self.execute(effect);
        }
        Ok(())
    }

    fn execute(&mut self, effect: SessionEffect) {
        let origin = *self.session.id();
        let queue = self.queue.clone();
        let ctx = Arc::clone(&self.ctx);

        match effect {
            SessionEffect::BeginTransport => {
                let transport = Arc::clone(&self.services.transport);
                let listener: Arc<dyn TransportListener> =
                    Arc::new(QueueListener::new(origin, queue.clone()));
                tokio::spawn(async move {
                    if let Err(err) = transport.begin(&ctx, listener).await {
                        feed(&queue, origin, SessionEvent::TransportFailed(err.to_string()));
                    }
                });
            }

            SessionEffect::EndTransport => {
                let transport = Arc::clone(&self.services.transport);
                tokio::spawn(async move {
                    if let Err(err) = transport.end().await {
                        warn!(session_id = %origin, error = %err, "transport did not close cleanly");
                    }
                });
            }

            SessionEffect::ArmTimer { started_at } => {
                let elapsed = Timestamp::now()
                    .duration_since(&started_at)
                    .to_std()
                    .unwrap_or(Duration::ZERO);
                let start = Instant::now().checked_sub(elapsed).unwrap_or_else(Instant::now);
                self.timer.arm(start, move || {
                    feed(&queue, origin, SessionEvent::TimerWarning);
                });
                debug!(session_id = %origin, delay = ?self.timer.delay(), "time-limit warning armed");
            }

            SessionEffect::CancelTimer => self.timer.cancel(),

            SessionEffect::RecordSession { started_at } => {
                let recorder = Arc::clone(&self.services.recorder);
                let limit = self.settings.persistence_timeout;
                tokio::spawn(async move {
                    let event = match timeout(limit, recorder.create(&ctx, started_at)).await {
                        Ok(Ok(id)) => SessionEvent::SessionRecorded(id),
                        Ok(Err(err)) => SessionEvent::SessionRecordFailed(err.to_string()),
                        Err(_) => SessionEvent::SessionRecordFailed(
                            StoreError::Timeout {
                                timeout_secs: limit.as_secs(),
                            }
                            .to_string(),
                        ),
                    };
                    if let SessionEvent::SessionRecordFailed(reason) = &event {
                        warn!(session_id = %origin, error = %reason, "session record failed");
                    }
                    feed(&queue, origin, event);
                });
            }

            SessionEffect::ExportTranscript(export) => {
                let exporter = Arc::clone(&self.services.exporter);
                tokio::spawn(async move {
                    match exporter.run(&export).await {
                        Ok(location) => info!(
                            session_id = %origin,
                            file = %export.file_name,
                            location = %location,
                            "transcript exported"
                        ),
                        Err(err) => warn!(
                            session_id = %origin,
                            file = %export.file_name,
                            error = %err,
                            "transcript export abandoned"
                        ),
                    }
                });
            }

            SessionEffect::RequestEvaluation(request) => {
                let scorer = Arc::clone(&self.services.scorer);
                let limit = self.settings.scoring_timeout;
                tokio::spawn(async move {
                    let event = match timeout(limit, scorer.score(&ctx, &request)).await {
                        Ok(Ok(metrics)) => SessionEvent::EvaluationReady(metrics),
                        Ok(Err(err)) => SessionEvent::EvaluationFailed(err.to_string()),
                        Err(_) => SessionEvent::EvaluationFailed(
                            ScoringError::Timeout {
                                timeout_secs: limit.as_secs(),
                            }
                            .to_string(),
                        ),
                    };
                    if let SessionEvent::EvaluationFailed(reason) = &event {
                        warn!(session_id = %origin, error = %reason, "scoring failed");
                    }
                    feed(&queue, origin, event);
                });
            }

            SessionEffect::PersistEvaluation {
                session_id,
                user_session_id,
                metrics,
            } => {
                let store = Arc::clone(&self.services.store);
                let limit = self.settings.persistence_timeout;
                tokio::spawn(async move {
                    let event = match timeout(limit, store.save(&ctx, user_session_id, &metrics)).await {
                        Ok(Ok(())) => SessionEvent::PersistenceSucceeded,
                        Ok(Err(err)) => SessionEvent::PersistenceFailed(err.to_string()),
                        Err(_) => SessionEvent::PersistenceFailed(
                            StoreError::Timeout {
                                timeout_secs: limit.as_secs(),
                            }
                            .to_string(),
                        ),
                    };
                    if let SessionEvent::PersistenceFailed(reason) = &event {
                        warn!(
                            session_id = %session_id,
                            user_session_id = %user_session_id,
                            error = %reason,
                            "evaluation save failed"
                        );
                    }
                    feed(&queue, origin, event);
                });
            }

            SessionEffect::PersistReflection {
                user_session_id,
                reflection,
            } => {
                let recorder = Arc::clone(&self.services.recorder);
                let limit = self.settings.persistence_timeout;
                tokio::spawn(async move {
                    let saved =
                        timeout(limit, recorder.save_reflection(&ctx, user_session_id, &reflection))
                            .await;
                    match saved {
                        Ok(Ok(())) => debug!(user_session_id = %user_session_id, "reflection saved"),
                        Ok(Err(err)) => {
                            warn!(user_session_id = %user_session_id, error = %err, "reflection not saved")
                        }
                        Err(_) => warn!(user_session_id = %user_session_id, "reflection save timed out"),
                    }
                });
            }
        }
    }

    /// Navigate-away teardown: stops the timer and closes an open
    /// transport. Nothing is persisted.
    async fn close(&mut self) {
        self.timer.cancel();
        if self.session.phase().has_open_transport() {
            if let Err(err) = self.services.transport.end().await {
                warn!(session_id = %self.session.id(), error = %err, "transport did not close cleanly");
            }
        }
        info!(session_id = %self.session.id(), phase = %self.session.phase(), "session runtime stopped");
    }
}

/// Cloneable handle to a running session.
///
/// Every method waits for the runtime to process the command and returns
/// `Unavailable` once the runtime has stopped.
#[derive(Clone)]
pub struct SessionHandle {
    tx: UnboundedSender<Command>,
}

impl SessionHandle {
    /// Reads the permission source and requests a start.
    pub async fn start(&self) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Start { reply })?;
        rx.await.map_err(|_| SessionError::Unavailable)?
    }

    /// Sends a user action. Collaborator results are rejected with
    /// `NotUserAction`; they only enter through the runtime's own tasks.
    pub(crate) async fn apply(&self, event: SessionEvent) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Event {
            origin: None,
            event,
            reply: Some(reply),
        })?;
        rx.await.map_err(|_| SessionError::Unavailable)?
    }

    pub async fn end(&self) -> Result<(), SessionError> {
        self.apply(SessionEvent::RequestEnd { at: Timestamp::now() }).await
    }

    pub async fn retry_evaluation(&self) -> Result<(), SessionError> {
        self.apply(SessionEvent::RetryEvaluation { at: Timestamp::now() }).await
    }

    pub async fn retry_persistence(&self) -> Result<(), SessionError> {
        self.apply(SessionEvent::RetryPersistence).await
    }

    pub async fn dismiss_warning(&self) -> Result<(), SessionError> {
        self.apply(SessionEvent::DismissWarning).await
    }

    pub async fn submit_reflection(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.apply(SessionEvent::SubmitReflection(text.into())).await
    }

    pub async fn skip_reflection(&self) -> Result<(), SessionError> {
        self.apply(SessionEvent::SkipReflection).await
    }

    pub async fn dismiss_evaluation(&self) -> Result<(), SessionError> {
        self.apply(SessionEvent::DismissEvaluation).await
    }

    pub async fn reset(&self) -> Result<(), SessionError> {
        self.apply(SessionEvent::Reset).await
    }

    pub async fn snapshot(&self) -> Result<SessionView, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        rx.await.map_err(|_| SessionError::Unavailable)
    }

    /// Stops the runtime without persisting anything.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown { reply })?;
        rx.await.map_err(|_| SessionError::Unavailable)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, command: Command) -> Result<(), SessionError> {
        self.tx.send(command).map_err(|_| SessionError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        InMemorySessionStore, InMemoryTranscriptSink, MockScorer, ScriptedTransport,
        StaticPermission, TransportStep,
    };
    use crate::application::supervisor::RecoveryPolicy;
    use crate::domain::evaluation::EvaluationMetrics;
    use crate::domain::foundation::{ErrorCode, UserId};
    use crate::domain::session::SessionPhase;

    struct Fixture {
        transport: ScriptedTransport,
        permission: StaticPermission,
        scorer: MockScorer,
        store: InMemorySessionStore,
        sink: InMemoryTranscriptSink,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                transport: ScriptedTransport::new()
                    .with_step(TransportStep::Connect)
                    .with_step(TransportStep::Message("<Coach>Hello</Coach>".into()))
                    .with_step(TransportStep::Message(
                        r#"{"message":"Hi there","source":"user"}"#.into(),
                    )),
                permission: StaticPermission::new(true),
                scorer: MockScorer::new(),
                store: InMemorySessionStore::new(),
                sink: InMemoryTranscriptSink::new(),
            }
        }

        fn spawn(&self, settings: RuntimeSettings) -> SessionHandle {
            let services = SessionServices {
                transport: Arc::new(self.transport.clone()),
                permission: Arc::new(self.permission.clone()),
                scorer: Arc::new(self.scorer.clone()),
                recorder: Arc::new(self.store.clone()),
                store: Arc::new(self.store.clone()),
                exporter: Arc::new(Supervisor::new(
                    TranscriptExporter::new(Arc::new(self.sink.clone())),
                    RecoveryPolicy::default(),
                )),
            };
            let ctx = SessionContext::new(UserId::new("user-1").unwrap(), "token");
            SessionRuntime::spawn(ctx, services, settings)
        }
    }

    async fn wait_until(handle: &SessionHandle, pred: impl Fn(&SessionView) -> bool) -> SessionView {
        for _ in 0..500 {
            let view = handle.snapshot().await.unwrap();
            if pred(&view) {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached: {:?}", handle.snapshot().await);
    }

    async fn run_to_ending(handle: &SessionHandle) {
        handle.start().await.unwrap();
        wait_until(handle, |v| {
            v.phase == SessionPhase::Active && v.messages.len() == 2 && v.user_session_id.is_some()
        })
        .await;
        handle.end().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn permission_denied_never_touches_transport() {
        let fixture = Fixture::new();
        fixture.permission.set(false);
        let handle = fixture.spawn(RuntimeSettings::default());

        handle.start().await.unwrap();
        let view = handle.snapshot().await.unwrap();

        assert_eq!(view.phase, SessionPhase::Failed);
        assert_eq!(view.error.unwrap().code, ErrorCode::PermissionDenied);
        tokio::task::yield_now().await;
        assert_eq!(fixture.transport.begin_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn full_session_completes_and_persists_once() {
        let fixture = Fixture::new();
        let handle = fixture.spawn(RuntimeSettings::default());

        run_to_ending(&handle).await;
        let view = wait_until(&handle, |v| v.phase == SessionPhase::Completed).await;

        assert!(view.show_evaluation_modal);
        assert!(view.evaluation_data.is_some());
        assert_eq!(fixture.scorer.call_count(), 1);
        assert_eq!(fixture.store.save_calls().len(), 1);
        assert_eq!(fixture.store.evaluation_count().await, 1);
        assert_eq!(fixture.transport.end_calls(), 1);

        let exports = fixture.sink.saved();
        assert_eq!(exports.len(), 1);
        let lines: Vec<&str> = exports[0].document.lines().collect();
        assert_eq!(lines.len(), 6, "{:?}", lines);
        assert!(lines[0].starts_with("Conversation started: "));
        assert!(lines[5].starts_with("Conversation ended: "));
        assert_eq!(
            lines[1..5],
            [
                "",
                format!("Coach ({}): Hello", view.messages[0].timestamp).as_str(),
                format!("User ({}): Hi there", view.messages[1].timestamp).as_str(),
                "",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn caller_cannot_report_collaborator_results() {
        let mut fixture = Fixture::new();
        fixture.store = InMemorySessionStore::new().with_save_delay(Duration::from_secs(2));
        let handle = fixture.spawn(RuntimeSettings::default());

        run_to_ending(&handle).await;
        wait_until(&handle, |v| v.phase == SessionPhase::Saving).await;

        assert_eq!(
            handle.apply(SessionEvent::PersistenceSucceeded).await,
            Err(SessionError::NotUserAction("persistenceSucceeded"))
        );
        let view = handle.snapshot().await.unwrap();
        assert_eq!(view.phase, SessionPhase::Saving);
        assert!(!view.show_evaluation_modal);

        let view = wait_until(&handle, |v| v.phase == SessionPhase::Completed).await;
        assert!(view.show_evaluation_modal);
        assert_eq!(fixture.store.evaluation_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn caller_cannot_bypass_permission_source() {
        let fixture = Fixture::new();
        fixture.permission.set(false);
        let handle = fixture.spawn(RuntimeSettings::default());

        assert_eq!(
            handle.apply(SessionEvent::RequestStart { has_permission: true }).await,
            Err(SessionError::NotUserAction("requestStart"))
        );
        assert_eq!(handle.snapshot().await.unwrap().phase, SessionPhase::Idle);
        tokio::task::yield_now().await;
        assert_eq!(fixture.transport.begin_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_session_record_is_recreated_on_persistence_retry() {
        let mut fixture = Fixture::new();
        // Once at connect, once more when the metrics arrive without a record.
        fixture.store = InMemorySessionStore::new()
            .fail_next_create(StoreError::Database("primary unavailable".into()))
            .fail_next_create(StoreError::Database("primary unavailable".into()));
        let handle = fixture.spawn(RuntimeSettings::default());

        handle.start().await.unwrap();
        wait_until(&handle, |v| v.phase == SessionPhase::Active && v.messages.len() == 2).await;
        handle.end().await.unwrap();

        let held = wait_until(&handle, |v| {
            v.error
                .as_ref()
                .map_or(false, |e| e.message.contains("primary unavailable"))
        })
        .await;
        assert_eq!(held.phase, SessionPhase::Ending);
        assert!(held.evaluation_data.is_some());
        assert_eq!(held.user_session_id, None);
        let error = held.error.unwrap();
        assert_eq!(error.code, ErrorCode::PersistenceFailure);
        assert!(error.retryable);
        assert_eq!(fixture.store.record_count().await, 0);
        assert!(fixture.store.save_calls().is_empty());

        handle.retry_persistence().await.unwrap();
        let done = wait_until(&handle, |v| v.phase == SessionPhase::Completed).await;

        assert!(done.show_evaluation_modal);
        assert_eq!(done.evaluation_data, held.evaluation_data);
        assert_eq!(fixture.scorer.call_count(), 1);
        assert_eq!(fixture.store.record_count().await, 1);
        let calls = fixture.store.save_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(Some(calls[0].0), done.user_session_id);
    }

    #[tokio::test(start_paused = true)]
    async fn persistence_retry_reuses_metrics_without_rescoring() {
        let mut fixture = Fixture::new();
        fixture.store = InMemorySessionStore::new()
            .fail_next_save(StoreError::Database("connection reset".into()));
        let metrics = EvaluationMetrics::builder().strength("Clear").duration("2:00").build();
        fixture.scorer = MockScorer::new().with_metrics(metrics.clone());
        let handle = fixture.spawn(RuntimeSettings::default());

        run_to_ending(&handle).await;
        let view = wait_until(&handle, |v| {
            v.phase == SessionPhase::Ending && v.error.is_some() && v.evaluation_data.is_some()
        })
        .await;
        assert_eq!(view.error.unwrap().code, ErrorCode::PersistenceFailure);

        handle.retry_persistence().await.unwrap();
        wait_until(&handle, |v| v.phase == SessionPhase::Completed).await;

        assert_eq!(fixture.scorer.call_count(), 1);
        let calls = fixture.store.save_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
        assert_eq!(calls[1].1, metrics);
    }

    #[tokio::test(start_paused = true)]
    async fn scoring_timeout_surfaces_as_scoring_failure() {
        let mut fixture = Fixture::new();
        fixture.scorer = MockScorer::new().with_delay(Duration::from_secs(120));
        let settings = RuntimeSettings {
            scoring_timeout: Duration::from_secs(1),
            ..RuntimeSettings::default()
        };
        let handle = fixture.spawn(settings);

        run_to_ending(&handle).await;
        let view = wait_until(&handle, |v| v.error.is_some()).await;

        assert_eq!(view.phase, SessionPhase::Ending);
        let error = view.error.unwrap();
        assert_eq!(error.code, ErrorCode::ScoringFailure);
        assert!(error.retryable);
    }

    #[tokio::test(start_paused = true)]
    async fn time_limit_warning_fires_after_delay() {
        let fixture = Fixture::new();
        let settings = RuntimeSettings {
            time_limit_warning: Duration::from_secs(60),
            ..RuntimeSettings::default()
        };
        let handle = fixture.spawn(settings);
        handle.start().await.unwrap();
        wait_until(&handle, |v| v.phase == SessionPhase::Active).await;

        tokio::time::sleep(Duration::from_secs(61)).await;
        let view = handle.snapshot().await.unwrap();
        assert_eq!(view.phase, SessionPhase::Warned);
        assert!(view.show_time_limit_warning);

        handle.dismiss_warning().await.unwrap();
        assert!(!handle.snapshot().await.unwrap().show_time_limit_warning);
    }

    #[tokio::test(start_paused = true)]
    async fn warning_after_end_is_not_delivered() {
        let fixture = Fixture::new();
        let settings = RuntimeSettings {
            time_limit_warning: Duration::from_secs(60),
            ..RuntimeSettings::default()
        };
        let handle = fixture.spawn(settings);

        run_to_ending(&handle).await;
        wait_until(&handle, |v| v.phase == SessionPhase::Completed).await;
        tokio::time::sleep(Duration::from_secs(120)).await;

        let view = handle.snapshot().await.unwrap();
        assert_eq!(view.phase, SessionPhase::Completed);
        assert!(!view.show_time_limit_warning);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_is_fatal() {
        let fixture = Fixture::new();
        let handle = fixture.spawn(RuntimeSettings::default());
        handle.start().await.unwrap();
        wait_until(&handle, |v| v.phase == SessionPhase::Active).await;

        fixture.transport.emit(TransportStep::Fail("socket closed".into()));
        let view = wait_until(&handle, |v| v.phase == SessionPhase::Failed).await;

        let error = view.error.unwrap();
        assert_eq!(error.code, ErrorCode::TransportFailure);
        assert!(error.message.contains("socket closed"));
        assert!(!error.retryable);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_is_rejected_mid_conversation() {
        let fixture = Fixture::new();
        let handle = fixture.spawn(RuntimeSettings::default());
        handle.start().await.unwrap();
        wait_until(&handle, |v| v.phase == SessionPhase::Active).await;

        assert_eq!(
            handle.reset().await,
            Err(SessionError::ResetNotAllowed(SessionPhase::Active))
        );
        assert_eq!(handle.snapshot().await.unwrap().phase, SessionPhase::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_closes_open_transport_without_saving() {
        let fixture = Fixture::new();
        let handle = fixture.spawn(RuntimeSettings::default());
        handle.start().await.unwrap();
        wait_until(&handle, |v| v.phase == SessionPhase::Active).await;

        handle.shutdown().await.unwrap();

        assert_eq!(fixture.transport.end_calls(), 1);
        assert!(!fixture.transport.is_open());
        assert!(fixture.store.save_calls().is_empty());
        assert_eq!(handle.snapshot().await, Err(SessionError::Unavailable));
    }

    #[tokio::test(start_paused = true)]
    async fn reflection_is_saved_against_record() {
        let fixture = Fixture::new();
        let handle = fixture.spawn(RuntimeSettings::default());

        run_to_ending(&handle).await;
        handle.submit_reflection("I interrupted too often").await.unwrap();
        let view = wait_until(&handle, |v| v.phase == SessionPhase::Completed).await;

        let record = fixture.store.get(view.user_session_id.unwrap()).await.unwrap();
        assert_eq!(record.reflection.as_deref(), Some("I interrupted too often"));
        assert!(!view.show_reflection_modal);
    }
}

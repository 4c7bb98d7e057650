//! Replays recorded transport payloads through a full session.
//!
//! ```text
//! conversation-coach <payload-file>
//! ```
//!
//! Each non-empty line of the file is delivered as one raw transport
//! payload. The session is started with permission granted, ended once
//! every line has been received, scored, persisted and exported. The final
//! session view is printed to stdout as JSON.
//!
//! Adapters follow configuration: the HTTP scorer when an endpoint is set
//! (mock scorer otherwise), PostgreSQL when a database URL is set
//! (in-memory otherwise), and the local transcript directory. The session
//! runs as `CONVERSATION_COACH__REPLAY__USER_ID` (default `replay`) with the
//! optional `CONVERSATION_COACH__REPLAY__ACCESS_TOKEN`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::info;

use conversation_coach::adapters::{
    HttpScorer, HttpScorerConfig, InMemorySessionStore, LocalTranscriptSink, MockScorer,
    PostgresSessionStore, ScriptedTransport, StaticPermission, TransportStep,
};
use conversation_coach::application::{
    RecoveryPolicy, RuntimeSettings, SessionHandle, SessionRuntime, SessionServices, Supervisor,
    TranscriptExporter,
};
use conversation_coach::config::{AppConfig, ConfigError, ScoringConfig, ValidationError};
use conversation_coach::domain::foundation::{SessionContext, UserId, ValidationError as IdError};
use conversation_coach::domain::session::{SessionError, SessionPhase, SessionView};
use conversation_coach::ports::{
    EvaluationScorer, EvaluationStore, ScoringError, SessionRecorder, StoreError,
};
use conversation_coach::telemetry::{self, TelemetryError};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
enum ReplayError {
    #[error("usage: conversation-coach <payload-file>")]
    Usage,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("Invalid user id: {0}")]
    User(#[from] IdError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to connect to database: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to render session view: {0}")]
    Render(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ReplayError> {
    let path = std::env::args().nth(1).map(PathBuf::from).ok_or(ReplayError::Usage)?;

    let config = AppConfig::load()?;
    config.validate()?;
    telemetry::init(&config.telemetry)?;

    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ReplayError::Read {
            path: path.clone(),
            source,
        })?;
    let payloads: Vec<&str> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    info!(file = %path.display(), payloads = payloads.len(), "replaying payloads");

    let transport = payloads.iter().fold(
        ScriptedTransport::new().with_step(TransportStep::Connect),
        |transport, line| transport.with_step(TransportStep::Message((*line).into())),
    );

    let (recorder, store) = session_store(&config).await?;
    let services = SessionServices {
        transport: Arc::new(transport),
        permission: Arc::new(StaticPermission::new(true)),
        scorer: scorer(&config.scoring)?,
        recorder,
        store,
        exporter: Arc::new(Supervisor::new(
            TranscriptExporter::new(Arc::new(LocalTranscriptSink::new(
                config.export.directory.clone(),
            ))),
            RecoveryPolicy::from(&config.recovery),
        )),
    };

    let ctx = SessionContext::from_secret(
        UserId::new(config.replay.user_id.clone())?,
        config.replay.access_token(),
    );

    let handle = SessionRuntime::spawn(ctx, services, RuntimeSettings::from(&config.session));

    handle.start().await?;
    let expected = payloads.len();
    let live = wait_for(&handle, |v| {
        v.phase == SessionPhase::Failed || (v.phase.is_live() && v.messages.len() >= expected)
    })
    .await?;

    let view = if live.phase == SessionPhase::Failed {
        live
    } else {
        handle.end().await?;
        handle.skip_reflection().await?;
        wait_for(&handle, |v| v.phase == SessionPhase::Completed || v.error.is_some()).await?
    };
    handle.shutdown().await?;

    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

async fn wait_for(
    handle: &SessionHandle,
    done: impl Fn(&SessionView) -> bool,
) -> Result<SessionView, SessionError> {
    loop {
        let view = handle.snapshot().await?;
        if done(&view) {
            return Ok(view);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

fn scorer(config: &ScoringConfig) -> Result<Arc<dyn EvaluationScorer>, ReplayError> {
    match &config.endpoint {
        Some(endpoint) => {
            let mut http = HttpScorerConfig::new(endpoint.clone()).with_timeout(config.timeout());
            if let Some(key) = &config.api_key {
                http = http.with_api_key(key.expose_secret().clone());
            }
            info!(endpoint = %endpoint, "using HTTP scorer");
            Ok(Arc::new(HttpScorer::new(http)?))
        }
        None => {
            info!("no scoring endpoint configured, using mock scorer");
            Ok(Arc::new(MockScorer::new()))
        }
    }
}

async fn session_store(
    config: &AppConfig,
) -> Result<(Arc<dyn SessionRecorder>, Arc<dyn EvaluationStore>), ReplayError> {
    match &config.database.url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .acquire_timeout(config.database.acquire_timeout())
                .connect(url)
                .await?;
            let store = Arc::new(PostgresSessionStore::new(pool));
            store.ensure_schema().await?;
            info!("using PostgreSQL session store");
            let recorder: Arc<dyn SessionRecorder> = store.clone();
            let store: Arc<dyn EvaluationStore> = store;
            Ok((recorder, store))
        }
        None => {
            info!("no database configured, using in-memory session store");
            let store = Arc::new(InMemorySessionStore::new());
            let recorder: Arc<dyn SessionRecorder> = store.clone();
            let store: Arc<dyn EvaluationStore> = store;
            Ok((recorder, store))
        }
    }
}

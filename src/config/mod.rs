//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CONVERSATION_COACH` prefix and nested values use double underscores as separators.
//!
//! Every section has defaults, so an empty environment yields a working
//! in-memory setup.
//!
//! # Example
//!
//! ```no_run
//! use conversation_coach::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Warning after {:?}", config.session.time_limit_warning());
//! ```

mod database;
mod error;
mod export;
mod recovery;
mod replay;
mod scoring;
mod session;
mod telemetry;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use export::ExportConfig;
pub use recovery::RecoveryConfig;
pub use replay::ReplayConfig;
pub use scoring::ScoringConfig;
pub use session::SessionConfig;
pub use telemetry::TelemetryConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Conversation timing (warning delay, call timeouts)
    #[serde(default)]
    pub session: SessionConfig,

    /// External scorer endpoint
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// PostgreSQL session store
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Transcript export directory
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Supervisory retry policy
    #[serde(default)]
    pub recovery: RecoveryConfig,

    /// Identity used by the replay binary
    #[serde(default)]
    pub replay: ReplayConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CONVERSATION_COACH` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CONVERSATION_COACH__SESSION__TIME_LIMIT_WARNING_SECS=120` -> `session.time_limit_warning_secs = 120`
    /// - `CONVERSATION_COACH__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CONVERSATION_COACH")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.session.validate()?;
        self.scoring.validate()?;
        self.database.validate()?;
        self.export.validate()?;
        self.telemetry.validate()?;
        self.recovery.validate()?;
        self.replay.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "CONVERSATION_COACH__SESSION__TIME_LIMIT_WARNING_SECS",
        "CONVERSATION_COACH__REPLAY__USER_ID",
        "CONVERSATION_COACH__REPLAY__ACCESS_TOKEN",
        "CONVERSATION_COACH__DATABASE__URL",
        "CONVERSATION_COACH__SCORING__ENDPOINT",
        "CONVERSATION_COACH__RECOVERY__MAX_ATTEMPTS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.session.time_limit_warning_secs, 300);
        assert_eq!(config.database.url, None);
        assert!(!config.scoring.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CONVERSATION_COACH__SESSION__TIME_LIMIT_WARNING_SECS", "120");
        env::set_var("CONVERSATION_COACH__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("CONVERSATION_COACH__SCORING__ENDPOINT", "https://scoring.test/evaluate");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.session.time_limit_warning_secs, 120);
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgresql://test@localhost/test")
        );
        assert!(config.scoring.is_configured());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_replay_identity_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CONVERSATION_COACH__REPLAY__USER_ID", "learner-7");
        env::set_var("CONVERSATION_COACH__REPLAY__ACCESS_TOKEN", "tok-abc");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.replay.user_id, "learner-7");
        assert_eq!(config.replay.access_token().expose_secret(), "tok-abc");
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CONVERSATION_COACH__RECOVERY__MAX_ATTEMPTS", "0");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.validate(), Err(ValidationError::InvalidMaxAttempts));
    }
}

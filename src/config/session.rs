//! Conversation session timing configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Timing for a single conversation session
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Delay after connection before the time-limit warning fires
    #[serde(default = "default_time_limit_warning")]
    pub time_limit_warning_secs: u64,

    /// Upper bound on one scorer call
    #[serde(default = "default_scoring_timeout")]
    pub scoring_timeout_secs: u64,

    /// Upper bound on one session-record or evaluation save
    #[serde(default = "default_persistence_timeout")]
    pub persistence_timeout_secs: u64,
}

impl SessionConfig {
    pub fn time_limit_warning(&self) -> Duration {
        Duration::from_secs(self.time_limit_warning_secs)
    }

    pub fn scoring_timeout(&self) -> Duration {
        Duration::from_secs(self.scoring_timeout_secs)
    }

    pub fn persistence_timeout(&self) -> Duration {
        Duration::from_secs(self.persistence_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.time_limit_warning_secs == 0 {
            return Err(ValidationError::InvalidWarningDelay);
        }
        if self.scoring_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("scoring"));
        }
        if self.persistence_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("persistence"));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit_warning_secs: default_time_limit_warning(),
            scoring_timeout_secs: default_scoring_timeout(),
            persistence_timeout_secs: default_persistence_timeout(),
        }
    }
}

/// Five minutes
fn default_time_limit_warning() -> u64 {
    300
}

fn default_scoring_timeout() -> u64 {
    60
}

fn default_persistence_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_timing() {
        let config = SessionConfig::default();
        assert_eq!(config.time_limit_warning(), Duration::from_secs(300));
        assert_eq!(config.scoring_timeout(), Duration::from_secs(60));
        assert_eq!(config.persistence_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_warning_delay_is_rejected() {
        let config = SessionConfig {
            time_limit_warning_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidWarningDelay));
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let config = SessionConfig {
            persistence_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidTimeout("persistence"))
        );
    }
}

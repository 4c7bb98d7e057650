//! Supervisory recovery configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Retry policy for supervised side work (transcript export)
#[derive(Debug, Clone, Deserialize)]
pub struct RecoveryConfig {
    /// Delay before a degraded child is re-attempted
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Attempts per supervised call before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl RecoveryConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::InvalidMaxAttempts);
        }
        Ok(())
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            retry_delay_secs: default_retry_delay(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_retry_delay() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    3
}

//! External scorer configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Remote scoring endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// Full URL of the scoring endpoint; without one the mock scorer is used
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer key for the endpoint
    #[serde(default)]
    pub api_key: Option<Secret<String>>,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ScoringConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ValidationError::InvalidScoringEndpoint);
            }
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("scoring client"));
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

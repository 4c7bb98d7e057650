//! Replay binary identity

use secrecy::Secret;
use serde::Deserialize;

use super::error::ValidationError;

/// Who the replay binary acts as
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayConfig {
    /// User the replayed session is recorded against
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Bearer token passed to collaborators; empty when unset
    #[serde(default)]
    pub access_token: Option<Secret<String>>,
}

impl ReplayConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("REPLAY__USER_ID"));
        }
        Ok(())
    }

    /// The configured token, or an empty one.
    pub fn access_token(&self) -> Secret<String> {
        self.access_token
            .clone()
            .unwrap_or_else(|| Secret::new(String::new()))
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            access_token: None,
        }
    }
}

fn default_user_id() -> String {
    "replay".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_to_replay_user_without_token() {
        let config = ReplayConfig::default();
        assert_eq!(config.user_id, "replay");
        assert_eq!(config.access_token().expose_secret(), "");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_user_is_rejected() {
        let config = ReplayConfig {
            user_id: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("REPLAY__USER_ID"))
        );
    }

    #[test]
    fn token_is_redacted_in_debug() {
        let config = ReplayConfig {
            access_token: Some(Secret::new("tok-123".to_string())),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("tok-123"));
        assert_eq!(config.access_token().expose_secret(), "tok-123");
    }
}

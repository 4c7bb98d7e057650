//! HTTP Scorer - EvaluationScorer backed by a remote scoring endpoint.
//!
//! Posts the [`ScoringRequest`] as JSON and expects an [`EvaluationMetrics`]
//! body in return.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpScorerConfig::new("https://scoring.example.com/evaluate")
//!     .with_api_key("sk-...")
//!     .with_timeout(Duration::from_secs(60));
//!
//! let scorer = HttpScorer::new(config)?;
//! ```
//!
//! # Authentication
//!
//! A configured API key is sent as the bearer token. Without one the
//! caller's session access token is forwarded instead.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

use crate::domain::evaluation::{EvaluationMetrics, ScoringRequest};
use crate::domain::foundation::SessionContext;
use crate::ports::{EvaluationScorer, ScoringError};

/// Configuration for the HTTP scorer.
#[derive(Debug, Clone)]
pub struct HttpScorerConfig {
    /// Full URL of the scoring endpoint.
    pub endpoint: String,
    api_key: Option<Secret<String>>,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpScorerConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bearer token for a request made on behalf of `ctx`.
    fn bearer<'a>(&'a self, ctx: &'a SessionContext) -> &'a str {
        match &self.api_key {
            Some(key) => key.expose_secret().as_str(),
            None => ctx.bearer_token(),
        }
    }
}

/// Remote scorer over HTTP.
pub struct HttpScorer {
    config: HttpScorerConfig,
    client: Client,
}

impl HttpScorer {
    /// # Errors
    ///
    /// Returns `Unavailable` if the HTTP client cannot be constructed.
    pub fn new(config: HttpScorerConfig) -> Result<Self, ScoringError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScoringError::Unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn map_send_error(&self, e: reqwest::Error) -> ScoringError {
        if e.is_timeout() {
            ScoringError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else if e.is_connect() {
            ScoringError::Unavailable(format!("Connection failed: {}", e))
        } else {
            ScoringError::Unavailable(e.to_string())
        }
    }

    /// Maps non-success statuses to scoring errors.
    async fn handle_response_status(response: Response) -> Result<Response, ScoringError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Self::status_error(status.as_u16(), body))
    }

    fn status_error(status: u16, body: String) -> ScoringError {
        match status {
            401 | 403 => ScoringError::Unauthorized,
            408 | 429 | 500..=599 => {
                ScoringError::Unavailable(format!("Server error {}: {}", status, body))
            }
            _ => ScoringError::InvalidResponse(format!("Unexpected status {}: {}", status, body)),
        }
    }
}

#[async_trait]
impl EvaluationScorer for HttpScorer {
    async fn score(
        &self,
        ctx: &SessionContext,
        request: &ScoringRequest,
    ) -> Result<EvaluationMetrics, ScoringError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(self.config.bearer(ctx))
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let response = Self::handle_response_status(response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e))?;
        serde_json::from_str(&body).map_err(|e| ScoringError::InvalidResponse(e.to_string()))
    }
}

//! Mock evaluation scorer for testing.
//!
//! Returns queued results in order and records every request so tests can
//! assert how often scoring ran.
//!
//! # Example
//!
//! ```ignore
//! let scorer = MockScorer::new()
//!     .with_error(ScoringError::Unavailable("down".into()))
//!     .with_metrics(metrics);
//!
//! assert!(scorer.score(&ctx, &request).await.is_err());
//! assert!(scorer.score(&ctx, &request).await.is_ok());
//! assert_eq!(scorer.call_count(), 2);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::evaluation::{EvaluationMetrics, ScoringRequest};
use crate::domain::foundation::SessionContext;
use crate::ports::{EvaluationScorer, ScoringError};

/// Scorer returning pre-configured results.
///
/// When the queue is empty every call succeeds with an empty metrics value
/// whose duration is taken from the request timing.
#[derive(Debug, Clone, Default)]
pub struct MockScorer {
    responses: Arc<Mutex<VecDeque<Result<EvaluationMetrics, ScoringError>>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<ScoringRequest>>>,
}

impl MockScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful result.
    pub fn with_metrics(self, metrics: EvaluationMetrics) -> Self {
        self.responses.lock().unwrap().push_back(Ok(metrics));
        self
    }

    /// Queues a failure.
    pub fn with_error(self, error: ScoringError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded requests.
    pub fn get_calls(&self) -> Vec<ScoringRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn next_response(&self, request: &ScoringRequest) -> Result<EvaluationMetrics, ScoringError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(EvaluationMetrics::builder()
                    .duration(request.timing.duration_label())
                    .build())
            })
    }
}

#[async_trait]
impl EvaluationScorer for MockScorer {
    async fn score(
        &self,
        _ctx: &SessionContext,
        request: &ScoringRequest,
    ) -> Result<EvaluationMetrics, ScoringError> {
        self.calls.lock().unwrap().push(request.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.next_response(request)
    }
}

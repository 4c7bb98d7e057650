//! Supervisory recovery wrapper.
//!
//! A [`Supervisor`] runs a child computation that may fail, absorbs the
//! fault, and keeps the owner alive in a degraded state. While degraded,
//! each new attempt first waits out the configured retry delay, unless
//! [`Supervisor::retry_now`] cuts the wait short. A success returns the
//! supervisor to `Healthy`.
//!
//! Used for side work whose failure must never reach the session, such as
//! transcript export.

use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::config::RecoveryConfig;
use crate::domain::conversation::TranscriptExport;
use crate::ports::{ExportError, TranscriptSink};

/// A fallible computation that can be supervised.
#[async_trait]
pub trait Supervised: Send + Sync {
    type Input: Send + Sync;
    type Output: Send;
    type Fault: fmt::Display + Send;

    async fn run(&self, input: &Self::Input) -> Result<Self::Output, Self::Fault>;
}

/// Current health of a supervised child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Health {
    Healthy,
    Degraded {
        /// Last fault, rendered.
        fault: String,
        since: Instant,
        /// Consecutive failed attempts.
        attempts: u32,
    },
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Health::Healthy)
    }
}

/// Retry bounds for one supervised call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryPolicy {
    pub retry_delay: Duration,
    pub max_attempts: u32,
}

impl From<&RecoveryConfig> for RecoveryPolicy {
    fn from(config: &RecoveryConfig) -> Self {
        Self {
            retry_delay: config.retry_delay(),
            max_attempts: config.max_attempts.max(1),
        }
    }
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self::from(&RecoveryConfig::default())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("gave up after {attempts} attempts: {last_fault}")]
pub struct RecoveryExhausted {
    pub attempts: u32,
    pub last_fault: String,
}

/// Runs a child under a recovery policy.
pub struct Supervisor<T: Supervised> {
    child: T,
    policy: RecoveryPolicy,
    health: Mutex<Health>,
    retry: Notify,
    /// Set by `retry_now`, consumed by the next degraded wait. Cleared when
    /// a new fault starts a fresh delay.
    retry_requested: AtomicBool,
}

impl<T: Supervised> Supervisor<T> {
    pub fn new(child: T, policy: RecoveryPolicy) -> Self {
        Self {
            child,
            policy,
            health: Mutex::new(Health::Healthy),
            retry: Notify::new(),
            retry_requested: AtomicBool::new(false),
        }
    }

    pub fn health(&self) -> Health {
        self.health.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Cuts the current retry delay short.
    ///
    /// Wakes attempts already waiting; an attempt that starts waiting later
    /// skips the delay once. Has no effect on a later fault's delay.
    pub fn retry_now(&self) {
        self.retry_requested.store(true, Ordering::SeqCst);
        self.retry.notify_waiters();
    }

    /// Runs the child, retrying after faults until it succeeds or the
    /// attempt budget for this call is spent.
    ///
    /// # Errors
    ///
    /// Returns [`RecoveryExhausted`] with the last fault once
    /// `max_attempts` attempts have failed. The supervisor stays degraded.
    pub async fn run(&self, input: &T::Input) -> Result<T::Output, RecoveryExhausted> {
        let mut tried = 0;
        loop {
            self.wait_out_degraded().await;

            tried += 1;
            match self.child.run(input).await {
                Ok(output) => {
                    self.set_health(Health::Healthy);
                    return Ok(output);
                }
                Err(fault) => {
                    let fault = fault.to_string();
                    let attempts = self.record_fault(fault.clone());
                    tracing::warn!(attempts, error = %fault, "supervised task failed");
                    if tried >= self.policy.max_attempts {
                        return Err(RecoveryExhausted {
                            attempts: tried,
                            last_fault: fault,
                        });
                    }
                }
            }
        }
    }

    async fn wait_out_degraded(&self) {
        let remaining = match self.health() {
            Health::Healthy => return,
            Health::Degraded { since, .. } => {
                (since + self.policy.retry_delay).saturating_duration_since(Instant::now())
            }
        };
        if remaining.is_zero() {
            return;
        }

        // Register before checking the flag so a concurrent retry_now is
        // seen by one or the other.
        let notified = self.retry.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.retry_requested.swap(false, Ordering::SeqCst) {
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(remaining) => {}
            _ = notified => {
                self.retry_requested.store(false, Ordering::SeqCst);
            }
        }
    }

    fn record_fault(&self, fault: String) -> u32 {
        let mut health = self.health.lock().unwrap_or_else(|e| e.into_inner());
        let attempts = match &*health {
            Health::Healthy => 1,
            Health::Degraded { attempts, .. } => attempts + 1,
        };
        *health = Health::Degraded {
            fault,
            since: Instant::now(),
            attempts,
        };
        self.retry_requested.store(false, Ordering::SeqCst);
        attempts
    }

    fn set_health(&self, next: Health) {
        *self.health.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }
}

/// Transcript export as a supervised child.
#[derive(Clone)]
pub struct TranscriptExporter {
    sink: Arc<dyn TranscriptSink>,
}

impl TranscriptExporter {
    pub fn new(sink: Arc<dyn TranscriptSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Supervised for TranscriptExporter {
    type Input = TranscriptExport;
    type Output = String;
    type Fault = ExportError;

    async fn run(&self, export: &TranscriptExport) -> Result<String, ExportError> {
        self.sink.save(export).await
    }
}

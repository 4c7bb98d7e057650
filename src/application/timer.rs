//! Conversation Timer - single time-limit warning per session.
//!
//! `arm` schedules one callback at `start + delay`. Re-arming cancels the
//! previous schedule, so at most one warning is pending at any time.
//! Cancelling is idempotent, including after the warning has fired.
//!
//! The timer never touches session state: the callback is expected to feed
//! a warning event back into the session's queue.
//!
//! Built on `tokio::time`, so tests drive it with a paused clock.

use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::{sleep_until, Instant};

/// Cancels one armed warning.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    abort: AbortHandle,
}

impl TimerHandle {
    /// Cancels the warning if it has not fired yet. Safe to call repeatedly.
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// Whether the warning already fired or was cancelled.
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Per-session warning scheduler.
#[derive(Debug)]
pub struct ConversationTimer {
    delay: Duration,
    pending: Option<TimerHandle>,
}

impl ConversationTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `on_warn` at `start + delay`, replacing any pending warning.
    ///
    /// A `start` in the past shortens the wait accordingly; a deadline that
    /// has already passed fires on the next scheduler tick.
    pub fn arm<F>(&mut self, start: Instant, on_warn: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let deadline = start + self.delay;
        let task = tokio::spawn(async move {
            sleep_until(deadline).await;
            on_warn();
        });

        let handle = TimerHandle {
            abort: task.abort_handle(),
        };
        self.pending = Some(handle.clone());
        handle
    }

    /// Cancels the pending warning, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.cancel();
        }
    }

    /// Whether a warning is scheduled and has not yet fired.
    pub fn is_armed(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for ConversationTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    const DELAY: Duration = Duration::from_secs(300);

    fn recorder() -> (
        mpsc::UnboundedSender<Instant>,
        mpsc::UnboundedReceiver<Instant>,
    ) {
        mpsc::unbounded_channel()
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_at_start_plus_delay() {
        let (tx, mut rx) = recorder();
        let mut timer = ConversationTimer::new(DELAY);
        let t0 = Instant::now();

        timer.arm(t0, move || {
            let _ = tx.send(Instant::now());
        });
        assert!(timer.is_armed());

        sleep(DELAY * 3).await;

        assert_eq!(rx.recv().await, Some(t0 + DELAY));
        assert!(rx.try_recv().is_err());
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_cancels_pending_warning() {
        let (tx, mut rx) = recorder();
        let mut timer = ConversationTimer::new(DELAY);
        let t0 = Instant::now();

        let first = tx.clone();
        timer.arm(t0, move || {
            let _ = first.send(Instant::now());
        });

        sleep(Duration::from_secs(1)).await;
        let t1 = Instant::now();
        assert_eq!(t1, t0 + Duration::from_secs(1));

        timer.arm(t1, move || {
            let _ = tx.send(Instant::now());
        });

        sleep(DELAY * 2).await;

        assert_eq!(rx.recv().await, Some(t1 + DELAY));
        assert!(rx.try_recv().is_err(), "only one warning may fire");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent_before_and_after_firing() {
        let (tx, mut rx) = recorder();
        let mut timer = ConversationTimer::new(DELAY);

        let handle = timer.arm(Instant::now(), move || {
            let _ = tx.send(Instant::now());
        });
        handle.cancel();
        handle.cancel();
        timer.cancel();

        sleep(DELAY * 2).await;
        assert!(rx.try_recv().is_err());

        let (tx, mut rx) = recorder();
        let handle = timer.arm(Instant::now(), move || {
            let _ = tx.send(Instant::now());
        });
        sleep(DELAY * 2).await;
        assert!(rx.recv().await.is_some());

        handle.cancel();
        timer.cancel();
        timer.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn start_in_the_past_shortens_wait() {
        let (tx, mut rx) = recorder();
        let mut timer = ConversationTimer::new(DELAY);
        sleep(Duration::from_secs(200)).await;

        let now = Instant::now();
        let started = now - Duration::from_secs(200);
        timer.arm(started, move || {
            let _ = tx.send(Instant::now());
        });

        sleep(DELAY).await;
        assert_eq!(rx.recv().await, Some(now + Duration::from_secs(100)));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_timer_cancels_warning() {
        let (tx, mut rx) = recorder();
        {
            let mut timer = ConversationTimer::new(DELAY);
            timer.arm(Instant::now(), move || {
                let _ = tx.send(Instant::now());
            });
        }
        sleep(DELAY * 2).await;
        assert!(rx.recv().await.is_none(), "sender dropped with the aborted task");
    }
}

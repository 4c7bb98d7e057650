//! Input handed to the external scorer.

use serde::Serialize;

use crate::domain::conversation::{Message, MessageSource};
use crate::domain::foundation::{SessionId, Timestamp};

/// Speech-timing metadata derived from the message log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechTiming {
    pub duration_secs: i64,
    pub user_word_count: usize,
    pub ai_word_count: usize,
    pub user_turns: usize,
    pub ai_turns: usize,
}

impl SpeechTiming {
    /// Measures the log between `started_at` and `ended_at`.
    pub fn measure(messages: &[Message], started_at: Option<Timestamp>, ended_at: Timestamp) -> Self {
        let duration_secs = started_at
            .map(|start| ended_at.duration_since(&start).num_seconds().max(0))
            .unwrap_or(0);

        let mut timing = Self {
            duration_secs,
            user_word_count: 0,
            ai_word_count: 0,
            user_turns: 0,
            ai_turns: 0,
        };
        for message in messages {
            match message.source {
                MessageSource::User => {
                    timing.user_turns += 1;
                    timing.user_word_count += message.word_count();
                }
                MessageSource::Ai => {
                    timing.ai_turns += 1;
                    timing.ai_word_count += message.word_count();
                }
            }
        }
        timing
    }

    /// `m:ss` rendering of the duration.
    pub fn duration_label(&self) -> String {
        format!("{}:{:02}", self.duration_secs / 60, self.duration_secs % 60)
    }
}

/// Read-only snapshot of a finished conversation for scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRequest {
    pub session_id: SessionId,
    pub messages: Vec<Message>,
    pub started_at: Option<Timestamp>,
    pub ended_at: Timestamp,
    pub timing: SpeechTiming,
}

impl ScoringRequest {
    /// Builds a request from a copy of the log.
    pub fn new(
        session_id: SessionId,
        messages: Vec<Message>,
        started_at: Option<Timestamp>,
        ended_at: Timestamp,
    ) -> Self {
        let timing = SpeechTiming::measure(&messages, started_at, ended_at);
        Self {
            session_id,
            messages,
            started_at,
            ended_at,
            timing,
        }
    }
}

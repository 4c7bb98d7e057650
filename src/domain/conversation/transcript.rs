//! Transcript formatter and export naming.
//!
//! ```text
//! Conversation started: 17/10/2026 14:05:09
//!
//! Coach (14:05:10): Hello
//! User (14:05:12): Hi there
//!
//! Conversation ended: 17/10/2026 14:10:02
//! ```
//!
//! Output is a pure function of the messages and start time, except for the
//! final line which always stamps the moment of formatting.

use serde::Serialize;

use crate::domain::foundation::{SessionId, Timestamp, UserId};

use super::{Message, MessageSource};

/// Speaker name for user-sourced lines.
pub const USER_SPEAKER: &str = "User";

/// Speaker name for AI lines that carry no markup label.
pub const AI_FALLBACK_SPEAKER: &str = "AI";

/// Extension of exported transcript files.
pub const TRANSCRIPT_EXTENSION: &str = "txt";

/// Renders ordered messages into a transcript document.
pub struct TranscriptFormatter;

impl TranscriptFormatter {
    /// Formats with the current time as the end marker.
    ///
    /// Without a start time the header stamps the same "now" as the footer.
    pub fn format(messages: &[Message], start_time: Option<Timestamp>) -> String {
        Self::format_at(messages, start_time, Timestamp::now())
    }

    /// Formats with an explicit end marker.
    pub fn format_at(messages: &[Message], start_time: Option<Timestamp>, ended_at: Timestamp) -> String {
        let started_at = start_time.unwrap_or(ended_at);
        let mut out = String::new();

        out.push_str(&format!("Conversation started: {}\n\n", started_at.to_date_time_string()));
        for message in messages {
            out.push_str(&Self::line(message));
            out.push('\n');
        }
        out.push_str(&format!("\nConversation ended: {}\n", ended_at.to_date_time_string()));
        out
    }

    /// Renders a single `"{speaker} ({timestamp}): {text}"` line.
    pub fn line(message: &Message) -> String {
        format!("{} ({}): {}", Self::speaker(message), message.timestamp, message.text)
    }

    /// Speaker column for a message.
    pub fn speaker(message: &Message) -> &str {
        match message.source {
            MessageSource::User => USER_SPEAKER,
            MessageSource::Ai => message.speaker_label.as_deref().unwrap_or(AI_FALLBACK_SPEAKER),
        }
    }
}

/// A formatted transcript ready for the file-save collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptExport {
    pub file_name: String,
    pub document: String,
}

impl TranscriptExport {
    /// Formats `messages` and names the file after the session, user and `ended_at`.
    pub fn build(
        session_id: &SessionId,
        user_id: &UserId,
        messages: &[Message],
        started_at: Option<Timestamp>,
        ended_at: Timestamp,
    ) -> Self {
        Self {
            file_name: export_file_name(session_id, user_id, &ended_at),
            document: TranscriptFormatter::format_at(messages, started_at, ended_at),
        }
    }
}

/// Deterministic export file name: `transcript_{session}_{user}_{stamp}.txt`.
///
/// The stamp has millisecond precision with `:` and `.` replaced, and the user
/// id is reduced to file-safe characters.
pub fn export_file_name(session_id: &SessionId, user_id: &UserId, at: &Timestamp) -> String {
    let user: String = user_id
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    format!(
        "transcript_{}_{}_{}.{}",
        session_id,
        user,
        at.to_file_safe_string(),
        TRANSCRIPT_EXTENSION
    )
}

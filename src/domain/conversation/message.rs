//! Canonical message record for one utterance.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{MessageId, Timestamp};

/// Who spoke an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    /// The AI persona. Also the fallback for unattributable payloads.
    #[default]
    Ai,
    User,
}

impl MessageSource {
    /// Parses a transport source tag (`"ai"` / `"user"`, case-insensitive).
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "ai" | "agent" | "assistant" => Some(MessageSource::Ai),
            "user" => Some(MessageSource::User),
            _ => None,
        }
    }

    /// Presentation family for this source.
    pub fn color_tag(&self) -> ColorTag {
        match self {
            MessageSource::Ai => ColorTag::Blue,
            MessageSource::User => ColorTag::Green,
        }
    }
}

impl fmt::Display for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageSource::Ai => write!(f, "ai"),
            MessageSource::User => write!(f, "user"),
        }
    }
}

/// Colour family hint consumed by transcript and UI rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Blue,
    Green,
}

impl ColorTag {
    /// Background utility class for a message bubble.
    pub fn css_class(&self) -> &'static str {
        match self {
            ColorTag::Blue => "bg-blue-100",
            ColorTag::Green => "bg-green-100",
        }
    }
}

/// One normalized utterance.
///
/// Messages are only ever appended to a session log; the log order is the
/// transcript order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    /// Content with speaker markup stripped.
    pub text: String,
    pub source: MessageSource,
    /// Wall-clock display stamp (`HH:MM:SS`).
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_label: Option<String>,
    pub color_tag: ColorTag,
    pub received_at: Timestamp,
}

impl Message {
    /// Creates a message, deriving the display stamp and colour from its inputs.
    pub fn new(
        text: impl Into<String>,
        source: MessageSource,
        speaker_label: Option<String>,
        received_at: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::new(),
            text: text.into(),
            source,
            timestamp: received_at.to_clock_string(),
            speaker_label,
            color_tag: source.color_tag(),
            received_at,
        }
    }

    /// Creates a user message received now.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, MessageSource::User, None, Timestamp::now())
    }

    /// Creates an AI message received now.
    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(text, MessageSource::Ai, None, Timestamp::now())
    }

    /// Sets the speaker label.
    pub fn with_speaker_label(mut self, label: impl Into<String>) -> Self {
        self.speaker_label = Some(label.into());
        self
    }

    /// Renders the text back into `<Label>text</Label>` form, or bare text when unlabelled.
    pub fn to_markup(&self) -> String {
        match &self.speaker_label {
            Some(label) => format!("<{label}>{}</{label}>", self.text),
            None => self.text.clone(),
        }
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_parses_known_tags() {
        assert_eq!(MessageSource::parse("ai"), Some(MessageSource::Ai));
        assert_eq!(MessageSource::parse(" User "), Some(MessageSource::User));
        assert_eq!(MessageSource::parse("narrator"), None);
    }

    #[test]
    fn color_tag_follows_source() {
        assert_eq!(Message::ai("x").color_tag, ColorTag::Blue);
        assert_eq!(Message::user("x").color_tag, ColorTag::Green);
        assert!(ColorTag::Blue.css_class().starts_with("bg-blue"));
        assert!(ColorTag::Green.css_class().starts_with("bg-green"));
    }

    #[test]
    fn timestamp_is_clock_of_received_at() {
        let msg = Message::user("hello");
        assert_eq!(msg.timestamp, msg.received_at.to_clock_string());
    }

    #[test]
    fn markup_includes_label_when_present() {
        let msg = Message::ai("Hello").with_speaker_label("Coach");
        assert_eq!(msg.to_markup(), "<Coach>Hello</Coach>");
        assert_eq!(Message::ai("Hello").to_markup(), "Hello");
    }

    #[test]
    fn serializes_with_camel_case_and_lowercase_source() {
        let msg = Message::user("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["source"], "user");
        assert_eq!(json["colorTag"], "green");
        assert!(json.get("speakerLabel").is_none());
    }

    #[test]
    fn word_count_ignores_extra_whitespace() {
        assert_eq!(Message::user("  one two   three ").word_count(), 3);
    }
}

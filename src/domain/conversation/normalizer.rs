//! Message normalizer.
//!
//! Turns whatever the voice transport delivers (bare strings, JSON text,
//! structured objects, speaker markup) into a canonical [`Message`].
//!
//! Normalization never fails. A payload that cannot be understood becomes
//! an AI-sourced message carrying the raw input as its text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::foundation::Timestamp;

use super::{Message, MessageSource};

/// Object keys accepted as the message text, in lookup order.
const TEXT_FIELDS: [&str; 2] = ["message", "text"];

/// Object key carrying the speaker source.
const SOURCE_FIELD: &str = "source";

/// Whole-string `<Label>body</Label>` wrapper. The closing label is captured
/// separately and compared, since the regex engine has no backreferences.
static SPEAKER_MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^<([^<>/]+)>(.*)</([^<>/]+)>$").expect("speaker markup pattern is valid")
});

/// Inbound payload as received from the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// A string that may or may not contain JSON.
    Text(String),
    /// An already-decoded structured value.
    Structured(Value),
}

impl From<String> for RawPayload {
    fn from(s: String) -> Self {
        RawPayload::Text(s)
    }
}

impl From<&str> for RawPayload {
    fn from(s: &str) -> Self {
        RawPayload::Text(s.to_string())
    }
}

impl From<Value> for RawPayload {
    fn from(v: Value) -> Self {
        RawPayload::Structured(v)
    }
}

/// Normalizes one inbound payload received at `received_at`.
pub fn normalize(raw: impl Into<RawPayload>, received_at: Timestamp) -> Message {
    let (text, source) = match raw.into() {
        RawPayload::Text(s) => match serde_json::from_str::<Value>(&s) {
            Ok(value) => resolve_value(&value).unwrap_or_else(|| (fallback_text(&value, &s), MessageSource::Ai)),
            Err(_) => (s, MessageSource::Ai),
        },
        RawPayload::Structured(value) => resolve_value(&value)
            .unwrap_or_else(|| (fallback_text(&value, &value.to_string()), MessageSource::Ai)),
    };

    let (speaker_label, text) = match extract_speaker(&text) {
        Some((label, body)) => (Some(label), body),
        None => (None, text),
    };

    Message::new(text, source, speaker_label, received_at)
}

/// Splits `<Label>body</Label>` into its parts. Returns `None` when the whole
/// (whitespace-trimmed) string is not a single matching wrapper.
pub fn extract_speaker(text: &str) -> Option<(String, String)> {
    let caps = SPEAKER_MARKUP.captures(text.trim())?;
    let open = caps.get(1)?.as_str();
    let close = caps.get(3)?.as_str();
    if open != close {
        return None;
    }
    Some((open.to_string(), caps.get(2)?.as_str().to_string()))
}

/// Reads text and source from an object exposing both.
fn resolve_value(value: &Value) -> Option<(String, MessageSource)> {
    let obj = value.as_object()?;
    let text = TEXT_FIELDS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))?;
    let source_tag = obj.get(SOURCE_FIELD)?.as_str()?;
    let source = MessageSource::parse(source_tag).unwrap_or_else(|| {
        tracing::warn!(source = source_tag, "Unknown message source, attributing to ai");
        MessageSource::Ai
    });
    Some((text.to_string(), source))
}

/// Whole-input text for payloads without a recognizable shape. A decoded JSON
/// string contributes its contents rather than its quoted form.
fn fallback_text(value: &Value, original: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        _ => original.to_string(),
    }
}

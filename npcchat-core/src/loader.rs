//! Message log loading.
//!
//! Reads a JSON array of `{player_id, text, timestamp}` records, validates
//! every record, and returns the messages in chronological order. Records
//! with equal timestamps keep their input order. The first bad record aborts
//! the load; nothing is skipped.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ChatError, Result};
use crate::types::{ChatMessage, PlayerId, Timestamp};

/// One record as it appears on disk, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    /// Sender id.
    #[serde(default)]
    pub player_id: Option<Value>,
    /// Message text.
    #[serde(default)]
    pub text: Option<Value>,
    /// ISO-8601 timestamp.
    #[serde(default)]
    pub timestamp: Option<Value>,
}

impl RawMessage {
    /// Convenience constructor for well-formed records.
    #[must_use]
    pub fn new(player_id: &str, text: &str, timestamp: &str) -> Self {
        Self {
            player_id: Some(Value::from(player_id)),
            text: Some(Value::from(text)),
            timestamp: Some(Value::from(timestamp)),
        }
    }
}

/// Validate `records` and sort them ascending by timestamp (stable).
///
/// # Errors
/// Returns [`ChatError::MalformedInput`] for the first record that is missing
/// a field, has a non-string field, or has an unparsable timestamp.
pub fn load(records: Vec<RawMessage>) -> Result<Vec<ChatMessage>> {
    let mut messages = records
        .into_iter()
        .enumerate()
        .map(|(index, raw)| validate(index, raw))
        .collect::<Result<Vec<_>>>()?;

    sort_chronologically(&mut messages);
    debug!(count = messages.len(), "messages sorted chronologically");
    Ok(messages)
}

/// Parse and load a JSON document.
///
/// # Errors
/// Returns [`ChatError::MalformedDocument`] if the text is not a JSON array of
/// objects, or [`ChatError::MalformedInput`] for a bad record.
pub fn load_from_str(json: &str) -> Result<Vec<ChatMessage>> {
    let document: Value =
        serde_json::from_str(json).map_err(|e| ChatError::MalformedDocument(e.to_string()))?;
    load_document(document)
}

/// Parse and load a JSON document from any reader.
///
/// # Errors
/// Same as [`load_from_str`].
pub fn load_from_reader(reader: impl Read) -> Result<Vec<ChatMessage>> {
    let document: Value = serde_json::from_reader(reader)
        .map_err(|e| ChatError::MalformedDocument(e.to_string()))?;
    load_document(document)
}

/// Read, parse and load a JSON file.
///
/// # Errors
/// Returns [`ChatError::Io`] if the file cannot be read, otherwise the same
/// errors as [`load_from_str`].
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Vec<ChatMessage>> {
    let path = path.as_ref();
    info!(path = %path.display(), "reading message log");
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

/// Stable sort by timestamp, oldest first.
pub fn sort_chronologically(messages: &mut [ChatMessage]) {
    messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}

fn load_document(document: Value) -> Result<Vec<ChatMessage>> {
    let Value::Array(items) = document else {
        return Err(ChatError::MalformedDocument(
            "expected a JSON array of message records".to_string(),
        ));
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(malformed(index, "record is not a JSON object"));
            }
            serde_json::from_value::<RawMessage>(item).map_err(|e| malformed(index, e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    load(records)
}

fn validate(index: usize, raw: RawMessage) -> Result<ChatMessage> {
    let player_id = required_string(index, "player_id", raw.player_id)?;
    let text = required_string(index, "text", raw.text)?;
    let timestamp = required_string(index, "timestamp", raw.timestamp)?;
    let timestamp = Timestamp::parse(&timestamp).map_err(|reason| malformed(index, reason))?;

    Ok(ChatMessage {
        player_id: PlayerId(player_id),
        text,
        timestamp,
    })
}

fn required_string(index: usize, field: &str, value: Option<Value>) -> Result<String> {
    match value {
        None | Some(Value::Null) => Err(malformed(index, format!("missing field '{field}'"))),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(malformed(
            index,
            format!("field '{field}' must be a string, got {other}"),
        )),
    }
}

fn malformed(index: usize, reason: impl Into<String>) -> ChatError {
    ChatError::MalformedInput {
        index,
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

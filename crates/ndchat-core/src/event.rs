use serde_json::Map;
use serde_json::Value;

use super::state::Attachment;

pub const UNKNOWN_ERROR: &str = "Unknown error";

/// One decoded line of the response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Thinking(String),
    ResumeReady(Attachment),
    Final(String),
    Error {
        message: String,
        trace: Option<String>,
    },
    /// A tag this client does not know yet. Carried so callers can log it.
    Unrecognized(String),
}

impl StreamEvent {
    pub fn kind(&self) -> &str {
        match self {
            Self::Thinking(_) => "thinking",
            Self::ResumeReady(_) => "resume_ready",
            Self::Final(_) => "final",
            Self::Error { .. } => "error",
            Self::Unrecognized(tag) => tag.as_str(),
        }
    }
}

/// Best-effort decode of one NDJSON line.
///
/// Returns `None` for blank lines, malformed JSON, and known tags that lack
/// their required payload. A bad line never stops the stream.
pub fn decode_line(line: &str) -> Option<StreamEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) else {
        tracing::trace!(line = trimmed, "skipping malformed stream line");
        return None;
    };
    let event = decode_object(&map);
    if event.is_none() {
        tracing::trace!(line = trimmed, "skipping stream line with missing payload");
    }
    event
}

fn decode_object(map: &Map<String, Value>) -> Option<StreamEvent> {
    let tag = map.get("event").and_then(Value::as_str)?;
    match tag {
        "thinking" => map.get("data").map(display_text).map(StreamEvent::Thinking),
        "resume_ready" => {
            let data = map.get("data")?.clone();
            serde_json::from_value::<Attachment>(data)
                .ok()
                .map(StreamEvent::ResumeReady)
        }
        "final" => map.get("response").map(display_text).map(StreamEvent::Final),
        "error" => {
            let message = map
                .get("message")
                .filter(|message| !is_blank_value(message))
                .map(display_text)
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            let trace = map.get("trace").and_then(Value::as_str).map(str::to_string);
            Some(StreamEvent::Error { message, trace })
        }
        other => Some(StreamEvent::Unrecognized(other.to_string())),
    }
}

/// Strings pass through untouched; anything else becomes compact JSON text.
fn display_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Null, `false`, zero and the empty string carry no message.
fn is_blank_value(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(text) => text.is_empty(),
        Value::Number(number) => number.as_f64() == Some(0.0),
        _ => false,
    }
}

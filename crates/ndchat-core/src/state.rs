use std::collections::HashMap;
use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// A downloadable artifact announced by the server. Two attachments are the
/// same attachment when their urls match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    pub name: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
            attachments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Empty assistant message that the stream fills in.
    pub fn placeholder(id: MessageId) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: String::new(),
            attachments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Replaces any attachment sharing `attachment.url`, keeping the new one last.
    pub fn merge_attachment(&mut self, attachment: Attachment) {
        self.attachments.retain(|existing| existing.url != attachment.url);
        self.attachments.push(attachment);
    }
}

pub type ThinkingLog = Vec<String>;

/// Per-request scratch space keyed by assistant message id.
///
/// Owned by whoever drives a request cycle and handed to every reducer call.
/// Nothing in here is visible on a message until the reducer commits it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSideTables {
    pub thinking: HashMap<MessageId, ThinkingLog>,
    pub pending: HashMap<MessageId, Attachment>,
}

impl StreamSideTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thinking_for(&self, id: &MessageId) -> &[String] {
        self.thinking.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn pending_for(&self, id: &MessageId) -> Option<&Attachment> {
        self.pending.get(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    Success,
    Failed(String),
    Cancelled,
}

impl SettleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub chat_id: String,
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub is_loading: bool,
    pub in_flight: Option<MessageId>,
    pub thinking_logs: HashMap<MessageId, ThinkingLog>,
}

impl SessionState {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            messages: Vec::new(),
            input: String::new(),
            is_loading: false,
            in_flight: None,
            thinking_logs: HashMap::new(),
        }
    }

    pub fn message(&self, id: &MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|message| &message.id == id)
    }

    pub fn message_mut(&mut self, id: &MessageId) -> Option<&mut ChatMessage> {
        self.messages.iter_mut().find(|message| &message.id == id)
    }

    /// Thinking lines archived for a settled assistant message.
    pub fn thinking_log(&self, id: &MessageId) -> &[String] {
        self.thinking_logs
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attachment(url: &str, name: &str) -> Attachment {
        Attachment {
            url: url.to_string(),
            name: name.to_string(),
            content_type: "application/pdf".to_string(),
        }
    }

    #[test]
    fn merge_attachment_replaces_same_url_and_moves_it_last() {
        let mut message = ChatMessage::placeholder(MessageId::from("a"));
        message.merge_attachment(attachment("u1", "first.pdf"));
        message.merge_attachment(attachment("u2", "second.pdf"));
        message.merge_attachment(attachment("u1", "renamed.pdf"));

        let names: Vec<&str> = message
            .attachments
            .iter()
            .map(|attachment| attachment.name.as_str())
            .collect();
        assert_eq!(names, vec!["second.pdf", "renamed.pdf"]);
    }

    #[test]
    fn attachment_uses_camel_case_content_type_on_the_wire() {
        let json = serde_json::to_value(attachment("u1", "f.pdf")).expect("serialize");
        assert_eq!(json["contentType"], "application/pdf");
        assert!(json.get("content_type").is_none());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).expect("serialize");
        assert_eq!(json, "\"assistant\"");
    }
}

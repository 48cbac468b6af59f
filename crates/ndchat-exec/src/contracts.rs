use ndchat_core::ChatMessage;
use ndchat_core::Role;
use serde::Deserialize;
use serde::Serialize;

/// A prior or new turn as the endpoint sees it: role and text only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// A file uploaded with a submission, carried inline as a data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingAttachment {
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestData {
    pub attachments: Vec<OutgoingAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<WireMessage>,
    pub data: RequestData,
    pub chat_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    pub chat_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn chat_request_matches_endpoint_shape() {
        let request = ChatRequest {
            messages: vec![WireMessage {
                role: Role::User,
                content: "hi".to_string(),
            }],
            data: RequestData {
                attachments: vec![OutgoingAttachment {
                    name: "cv.pdf".to_string(),
                    content_type: "application/pdf".to_string(),
                    content: "data:application/pdf;base64,AA==".to_string(),
                }],
            },
            chat_id: "001".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&request).expect("serialize"),
            json!({
                "messages": [{"role": "user", "content": "hi"}],
                "data": {"attachments": [{
                    "name": "cv.pdf",
                    "type": "application/pdf",
                    "content": "data:application/pdf;base64,AA=="
                }]},
                "chatId": "001"
            })
        );
    }

    #[test]
    fn reset_request_uses_chat_id_key() {
        let body = serde_json::to_value(ResetRequest {
            chat_id: "abc".to_string(),
        })
        .expect("serialize");
        assert_eq!(body, json!({"chatId": "abc"}));
    }
}

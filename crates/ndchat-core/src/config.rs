use serde::{Deserialize, Serialize};

use super::framer::TrailingFragment;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CHAT_PATH: &str = "/api/chat";
pub const DEFAULT_RESET_PATH: &str = "/api/session/reset";
pub const DEFAULT_CHAT_ID: &str = "001";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub endpoint: EndpointConfig,
    pub session: SessionConfig,
    pub stream: StreamConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: String,
    pub chat_path: String,
    pub reset_path: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            reset_path: DEFAULT_RESET_PATH.to_string(),
        }
    }
}

impl EndpointConfig {
    pub fn chat_url(&self) -> String {
        join_url(&self.base_url, &self.chat_path)
    }

    pub fn reset_url(&self) -> String {
        join_url(&self.base_url, &self.reset_path)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    pub chat_id: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chat_id: DEFAULT_CHAT_ID.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StreamConfig {
    pub trailing_fragment: TrailingFragment,
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"endpoint":{"base_url":"https://chat.example"}}"#)
                .expect("parse");
        assert_eq!(config.endpoint.base_url, "https://chat.example");
        assert_eq!(config.endpoint.chat_path, DEFAULT_CHAT_PATH);
        assert_eq!(config.session.chat_id, DEFAULT_CHAT_ID);
        assert_eq!(config.stream.trailing_fragment, TrailingFragment::Drop);
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let endpoint = EndpointConfig {
            base_url: "http://host:8000/".to_string(),
            ..EndpointConfig::default()
        };
        assert_eq!(endpoint.chat_url(), "http://host:8000/api/chat");
        assert_eq!(endpoint.reset_url(), "http://host:8000/api/session/reset");
    }

    #[test]
    fn trailing_fragment_reads_snake_case() {
        let config: Config =
            serde_json::from_str(r#"{"stream":{"trailing_fragment":"flush"}}"#).expect("parse");
        assert_eq!(config.stream.trailing_fragment, TrailingFragment::Flush);
    }
}

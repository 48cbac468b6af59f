use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use ndchat_core::config::EndpointConfig;
use reqwest::Client;

use crate::contracts::ChatRequest;
use crate::contracts::ResetRequest;
use crate::error::TransportError;

pub type ByteStream = BoxStream<'static, Result<Vec<u8>, TransportError>>;

#[async_trait]
pub trait ChatTransport: Send + Sync {
    fn name(&self) -> &'static str;

    /// Sends the chat request and hands back the raw response body.
    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, TransportError>;

    async fn reset(&self, chat_id: &str) -> Result<(), TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: EndpointConfig,
}

impl HttpTransport {
    pub fn new(endpoint: EndpointConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }

    pub fn with_client(client: Client, endpoint: EndpointConfig) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, TransportError> {
        let url = self.endpoint.chat_url();
        tracing::debug!(
            %url,
            messages = request.messages.len(),
            attachments = request.data.attachments.len(),
            "opening chat stream"
        );
        let response = self.client.post(&url).json(request).send().await?;
        let response = ensure_success(response).await?;

        let body = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|err| TransportError::Stream(err.to_string()))
            })
            .boxed();
        Ok(body)
    }

    async fn reset(&self, chat_id: &str) -> Result<(), TransportError> {
        let url = self.endpoint.reset_url();
        tracing::debug!(%url, chat_id, "resetting session");
        let body = ResetRequest {
            chat_id: chat_id.to_string(),
        };
        let response = self.client.post(&url).json(&body).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status {
        status: status.as_u16(),
        body: truncate(&body, 200),
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

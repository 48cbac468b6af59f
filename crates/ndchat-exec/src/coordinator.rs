use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use futures::StreamExt;
use ndchat_core::reduce;
use ndchat_core::ChatAction;
use ndchat_core::ChatEffect;
use ndchat_core::ChatMessage;
use ndchat_core::Config;
use ndchat_core::MessageId;
use ndchat_core::RuntimeAction;
use ndchat_core::SessionState;
use ndchat_core::SettleOutcome;
use ndchat_core::StreamSideTables;
use ndchat_core::UserAction;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::contracts::ChatRequest;
use crate::contracts::OutgoingAttachment;
use crate::contracts::RequestData;
use crate::contracts::WireMessage;
use crate::error::TransportError;
use crate::stream::event_stream;
use crate::transport::ChatTransport;

/// What the presentation layer gets to look at after each transition.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub state: &'a SessionState,
    pub assistant_id: Option<&'a MessageId>,
    pub thinking: &'a [String],
}

pub trait SessionObserver {
    fn on_frame(&mut self, frame: &Frame<'_>);

    /// Transient notice, e.g. a toast for a failed request.
    fn on_notice(&mut self, _message: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_frame(&mut self, _frame: &Frame<'_>) {}
}

#[derive(Debug, Clone, Default)]
pub struct Submission {
    /// Sent instead of the live input when it is not blank.
    pub content_override: Option<String>,
    pub attachments: Vec<OutgoingAttachment>,
}

impl Submission {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content_override: Some(content.into()),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<OutgoingAttachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Blank content; nothing was sent and nothing changed.
    Rejected,
    Settled {
        assistant_id: MessageId,
        outcome: SettleOutcome,
    },
}

/// Cancels whichever cycle is streaming when `stop` is called.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    slot: Arc<Mutex<Option<CancellationToken>>>,
}

impl StopHandle {
    /// Returns whether a cycle was streaming.
    pub fn stop(&self) -> bool {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(token) => {
                tracing::debug!("stop requested");
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn arm(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        token
    }

    fn disarm(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

pub struct ChatSession<T> {
    transport: T,
    config: Config,
    state: SessionState,
    tables: StreamSideTables,
    stop: StopHandle,
}

impl<T: ChatTransport> ChatSession<T> {
    pub fn new(transport: T, config: Config) -> Self {
        let state = SessionState::new(config.session.chat_id.clone());
        Self {
            transport,
            config,
            state,
            tables: StreamSideTables::new(),
            stop: StopHandle::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) -> bool {
        self.stop.stop()
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.dispatch(
            ChatAction::User(UserAction::SetInput(text.into())),
            None,
            &mut NoopObserver,
        );
    }

    /// Runs one request/response cycle to completion.
    pub async fn submit(
        &mut self,
        submission: Submission,
        observer: &mut dyn SessionObserver,
    ) -> CycleOutcome {
        let Some(content) =
            effective_content(submission.content_override.as_deref(), &self.state.input)
        else {
            tracing::debug!("rejecting blank submission");
            return CycleOutcome::Rejected;
        };

        let stem = Uuid::new_v4().simple().to_string();
        let user_id = MessageId(stem.clone());
        let assistant_id = MessageId(format!("{stem}-assistant"));
        let request = self.compose_request(&content, submission.attachments);

        let token = self.stop.arm();
        self.dispatch(
            ChatAction::Runtime(RuntimeAction::BeginRequest {
                user: ChatMessage::user(user_id, content),
                placeholder: ChatMessage::placeholder(assistant_id.clone()),
            }),
            Some(&assistant_id),
            observer,
        );
        tracing::debug!(
            %assistant_id,
            transport = self.transport.name(),
            "request cycle streaming"
        );

        let outcome = self
            .stream_response(&request, &assistant_id, &token, observer)
            .await;
        self.stop.disarm();
        if let SettleOutcome::Failed(message) = &outcome {
            tracing::warn!(%assistant_id, error = %message, "request cycle failed");
        }

        self.dispatch(
            ChatAction::Runtime(RuntimeAction::Settle {
                assistant_id: assistant_id.clone(),
                outcome: outcome.clone(),
            }),
            Some(&assistant_id),
            observer,
        );
        CycleOutcome::Settled {
            assistant_id,
            outcome,
        }
    }

    /// Asks the server to drop the session, then clears it locally.
    pub async fn reset(&mut self, observer: &mut dyn SessionObserver) -> Result<(), TransportError> {
        let chat_id = self.state.chat_id.clone();
        self.transport.reset(&chat_id).await?;
        tracing::debug!(chat_id = %chat_id, "session reset");
        self.dispatch(
            ChatAction::Runtime(RuntimeAction::ResetSession),
            None,
            observer,
        );
        Ok(())
    }

    fn compose_request(&self, content: &str, attachments: Vec<OutgoingAttachment>) -> ChatRequest {
        let mut messages: Vec<WireMessage> =
            self.state.messages.iter().map(WireMessage::from).collect();
        messages.push(WireMessage {
            role: ndchat_core::Role::User,
            content: content.to_string(),
        });
        ChatRequest {
            messages,
            data: RequestData { attachments },
            chat_id: self.state.chat_id.clone(),
        }
    }

    async fn stream_response(
        &mut self,
        request: &ChatRequest,
        assistant_id: &MessageId,
        token: &CancellationToken,
        observer: &mut dyn SessionObserver,
    ) -> SettleOutcome {
        let opened = tokio::select! {
            biased;
            _ = token.cancelled() => return SettleOutcome::Cancelled,
            opened = self.transport.open_stream(request) => opened,
        };
        let body = match opened {
            Ok(body) => body,
            Err(err) => return SettleOutcome::Failed(err.to_string()),
        };

        let mut events = event_stream(body, self.config.stream.trailing_fragment).boxed();
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => return SettleOutcome::Cancelled,
                next = events.next() => next,
            };
            match next {
                None => return SettleOutcome::Success,
                Some(Ok(event)) => {
                    tracing::trace!(%assistant_id, kind = event.kind(), "stream event");
                    self.dispatch(
                        ChatAction::Stream {
                            assistant_id: assistant_id.clone(),
                            event,
                        },
                        Some(assistant_id),
                        observer,
                    );
                }
                Some(Err(err)) => return SettleOutcome::Failed(err.to_string()),
            }
        }
    }

    fn dispatch(
        &mut self,
        action: ChatAction,
        assistant_id: Option<&MessageId>,
        observer: &mut dyn SessionObserver,
    ) {
        let effects = reduce(&mut self.state, &mut self.tables, action);
        for effect in effects {
            match effect {
                ChatEffect::RequestFrame => {
                    let thinking = match assistant_id {
                        Some(id) if self.tables.thinking.contains_key(id) => {
                            self.tables.thinking_for(id)
                        }
                        Some(id) => self.state.thinking_log(id),
                        None => &[],
                    };
                    observer.on_frame(&Frame {
                        state: &self.state,
                        assistant_id,
                        thinking,
                    });
                }
                ChatEffect::Notify(message) => observer.on_notice(&message),
            }
        }
    }
}

fn effective_content(content_override: Option<&str>, input: &str) -> Option<String> {
    let content = match content_override {
        Some(text) if !text.trim().is_empty() => text,
        _ => input,
    };
    if content.trim().is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

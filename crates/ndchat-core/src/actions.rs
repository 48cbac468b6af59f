use super::event::StreamEvent;
use super::state::ChatMessage;
use super::state::MessageId;
use super::state::SettleOutcome;

#[derive(Debug, Clone)]
pub enum ChatAction {
    User(UserAction),
    Runtime(RuntimeAction),
    Stream {
        assistant_id: MessageId,
        event: StreamEvent,
    },
}

#[derive(Debug, Clone)]
pub enum UserAction {
    SetInput(String),
    ClearInput,
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    BeginRequest {
        user: ChatMessage,
        placeholder: ChatMessage,
    },
    Settle {
        assistant_id: MessageId,
        outcome: SettleOutcome,
    },
    ResetSession,
}

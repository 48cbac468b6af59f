use pretty_assertions::assert_eq;

pub(super) use super::reduce;
pub(super) use super::ChatEffect;
pub(super) use super::CANCELLED_NOTICE;
pub(super) use crate::actions::ChatAction;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::event::decode_line;
pub(super) use crate::event::StreamEvent;
pub(super) use crate::state::Attachment;
pub(super) use crate::state::ChatMessage;
pub(super) use crate::state::MessageId;
pub(super) use crate::state::Role;
pub(super) use crate::state::SessionState;
pub(super) use crate::state::SettleOutcome;
pub(super) use crate::state::StreamSideTables;

mod attachments;

const ASSISTANT: &str = "1-assistant";

fn assistant_id() -> MessageId {
    MessageId::from(ASSISTANT)
}

/// Session with one user message and an in-flight placeholder.
fn streaming() -> (SessionState, StreamSideTables) {
    let mut state = SessionState::new("001");
    let mut tables = StreamSideTables::new();
    let effects = reduce(
        &mut state,
        &mut tables,
        ChatAction::Runtime(RuntimeAction::BeginRequest {
            user: ChatMessage::user(MessageId::from("1"), "hi"),
            placeholder: ChatMessage::placeholder(assistant_id()),
        }),
    );
    assert_eq!(effects, vec![ChatEffect::RequestFrame]);
    (state, tables)
}

fn apply(state: &mut SessionState, tables: &mut StreamSideTables, event: StreamEvent) -> Vec<ChatEffect> {
    reduce(
        state,
        tables,
        ChatAction::Stream {
            assistant_id: assistant_id(),
            event,
        },
    )
}

/// Feeds raw NDJSON lines through the decoder, the way the stream does.
fn apply_lines(state: &mut SessionState, tables: &mut StreamSideTables, lines: &[&str]) {
    for line in lines {
        if let Some(event) = decode_line(line) {
            apply(state, tables, event);
        }
    }
}

fn settle(state: &mut SessionState, tables: &mut StreamSideTables, outcome: SettleOutcome) -> Vec<ChatEffect> {
    reduce(
        state,
        tables,
        ChatAction::Runtime(RuntimeAction::Settle {
            assistant_id: assistant_id(),
            outcome,
        }),
    )
}

fn placeholder(state: &SessionState) -> &ChatMessage {
    state.message(&assistant_id()).expect("placeholder present")
}

fn attachment(url: &str) -> Attachment {
    Attachment {
        url: url.to_string(),
        name: "f.pdf".to_string(),
        content_type: "application/pdf".to_string(),
    }
}

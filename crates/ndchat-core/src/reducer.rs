#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEffect {
    RequestFrame,
    /// Transient user-facing notice (toast). Never written into a message.
    Notify(String),
}

use super::actions::ChatAction;
use super::actions::RuntimeAction;
use super::actions::UserAction;
use super::event::StreamEvent;
use super::state::MessageId;
use super::state::SessionState;
use super::state::SettleOutcome;
use super::state::StreamSideTables;

pub const CANCELLED_NOTICE: &str = "Request cancelled";

pub fn reduce(
    state: &mut SessionState,
    tables: &mut StreamSideTables,
    action: ChatAction,
) -> Vec<ChatEffect> {
    match action {
        ChatAction::User(user) => reduce_user(state, user),
        ChatAction::Runtime(runtime) => reduce_runtime(state, tables, runtime),
        ChatAction::Stream {
            assistant_id,
            event,
        } => reduce_stream(state, tables, assistant_id, event),
    }
}

fn reduce_user(state: &mut SessionState, action: UserAction) -> Vec<ChatEffect> {
    match action {
        UserAction::SetInput(text) => {
            state.input = text;
        }
        UserAction::ClearInput => {
            state.input.clear();
        }
    }
    vec![ChatEffect::RequestFrame]
}

fn reduce_runtime(
    state: &mut SessionState,
    tables: &mut StreamSideTables,
    action: RuntimeAction,
) -> Vec<ChatEffect> {
    match action {
        RuntimeAction::BeginRequest { user, placeholder } => {
            if let Some(active) = &state.in_flight {
                tracing::warn!(%active, "request already in flight; ignoring begin");
                return Vec::new();
            }
            tables.thinking.entry(placeholder.id.clone()).or_default();
            state.in_flight = Some(placeholder.id.clone());
            state.messages.push(user);
            state.messages.push(placeholder);
            state.is_loading = true;
            state.input.clear();
            vec![ChatEffect::RequestFrame]
        }
        RuntimeAction::Settle {
            assistant_id,
            outcome,
        } => {
            state.is_loading = false;
            if state.in_flight.as_ref() == Some(&assistant_id) {
                state.in_flight = None;
            }
            state.input.clear();
            let log = tables.thinking.remove(&assistant_id).unwrap_or_default();
            if !log.is_empty() {
                state.thinking_logs.insert(assistant_id.clone(), log);
            }
            tables.pending.remove(&assistant_id);
            tracing::debug!(%assistant_id, outcome = outcome.label(), "request settled");

            let mut effects = vec![ChatEffect::RequestFrame];
            match outcome {
                SettleOutcome::Success => {}
                SettleOutcome::Failed(message) => effects.push(ChatEffect::Notify(message)),
                SettleOutcome::Cancelled => {
                    effects.push(ChatEffect::Notify(CANCELLED_NOTICE.to_string()))
                }
            }
            effects
        }
        RuntimeAction::ResetSession => {
            state.messages.clear();
            state.thinking_logs.clear();
            state.input.clear();
            state.in_flight = None;
            *tables = StreamSideTables::default();
            vec![ChatEffect::RequestFrame]
        }
    }
}

fn reduce_stream(
    state: &mut SessionState,
    tables: &mut StreamSideTables,
    assistant_id: MessageId,
    event: StreamEvent,
) -> Vec<ChatEffect> {
    match event {
        StreamEvent::Thinking(line) => {
            tables.thinking.entry(assistant_id).or_default().push(line);
        }
        StreamEvent::ResumeReady(attachment) => {
            tables.pending.insert(assistant_id, attachment);
        }
        StreamEvent::Final(content) => {
            let pending = tables.pending.get(&assistant_id).cloned();
            let Some(message) = state.message_mut(&assistant_id) else {
                tracing::debug!(%assistant_id, "final event for unknown message");
                return Vec::new();
            };
            message.content = content;
            if let Some(attachment) = pending {
                message.merge_attachment(attachment);
            }
        }
        StreamEvent::Error { message: text, trace } => {
            if let Some(trace) = trace.as_deref() {
                tracing::debug!(%assistant_id, trace = %trace, "server reported error");
            }
            let Some(message) = state.message_mut(&assistant_id) else {
                tracing::debug!(%assistant_id, "error event for unknown message");
                return Vec::new();
            };
            message.content = format!("Error: {text}");
        }
        StreamEvent::Unrecognized(tag) => {
            tracing::debug!(%assistant_id, tag = %tag, "ignoring unrecognized stream event");
            return Vec::new();
        }
    }
    vec![ChatEffect::RequestFrame]
}

#[cfg(test)]
mod tests;

use std::io;
use std::io::Write;

use ndchat_core::MessageId;
use ndchat_exec::Frame;
use ndchat_exec::SessionObserver;

/// Streams thinking lines to stderr while a cycle runs, then prints the
/// settled reply and its attachment links to stdout.
pub struct TerminalObserver<O = io::Stdout, E = io::Stderr> {
    out: O,
    err: E,
    current: Option<MessageId>,
    shown_thinking: usize,
}

impl TerminalObserver {
    pub fn new() -> Self {
        Self::with_writers(io::stdout(), io::stderr())
    }
}

impl Default for TerminalObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Write, E: Write> TerminalObserver<O, E> {
    pub fn with_writers(out: O, err: E) -> Self {
        Self {
            out,
            err,
            current: None,
            shown_thinking: 0,
        }
    }

    #[cfg(test)]
    fn into_writers(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> SessionObserver for TerminalObserver<O, E> {
    fn on_frame(&mut self, frame: &Frame<'_>) {
        let Some(id) = frame.assistant_id else {
            return;
        };
        if self.current.as_ref() != Some(id) {
            self.current = Some(id.clone());
            self.shown_thinking = 0;
        }
        for line in frame.thinking.iter().skip(self.shown_thinking) {
            let _ = writeln!(self.err, "\u{b7} {line}");
        }
        self.shown_thinking = self.shown_thinking.max(frame.thinking.len());

        if frame.state.is_loading {
            return;
        }
        if let Some(message) = frame.state.message(id) {
            if !message.content.is_empty() {
                let _ = writeln!(self.out, "{}", message.content);
            }
            for attachment in &message.attachments {
                let _ = writeln!(
                    self.out,
                    "[{}] {} ({})",
                    attachment.name, attachment.url, attachment.content_type
                );
            }
        }
        let _ = self.out.flush();
        self.current = None;
    }

    fn on_notice(&mut self, message: &str) {
        let _ = writeln!(self.err, "! {message}");
    }
}

#[cfg(test)]
mod tests {
    use ndchat_core::Attachment;
    use ndchat_core::ChatMessage;
    use ndchat_core::MessageId;
    use ndchat_core::SessionState;
    use ndchat_exec::Frame;
    use ndchat_exec::SessionObserver;
    use pretty_assertions::assert_eq;

    use super::TerminalObserver;

    fn streaming_state(id: &MessageId) -> SessionState {
        let mut state = SessionState::new("001");
        state.messages.push(ChatMessage::placeholder(id.clone()));
        state.is_loading = true;
        state
    }

    #[test]
    fn thinking_lines_are_printed_once_each() {
        let id = MessageId::from("a-assistant");
        let state = streaming_state(&id);
        let mut observer = TerminalObserver::with_writers(Vec::new(), Vec::new());
        let log = vec!["plan".to_string(), "search".to_string()];

        for shown in [0, 1, 1, 2] {
            observer.on_frame(&Frame {
                state: &state,
                assistant_id: Some(&id),
                thinking: &log[..shown],
            });
        }

        let (out, err) = observer.into_writers();
        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(err).expect("utf8"),
            "\u{b7} plan\n\u{b7} search\n"
        );
    }

    #[test]
    fn settled_frame_prints_reply_and_links() {
        let id = MessageId::from("b-assistant");
        let mut state = streaming_state(&id);
        state.is_loading = false;
        if let Some(message) = state.message_mut(&id) {
            message.content = "Here you go".to_string();
            message.attachments.push(Attachment {
                url: "https://files/cv.pdf".to_string(),
                name: "cv.pdf".to_string(),
                content_type: "application/pdf".to_string(),
            });
        }
        let mut observer = TerminalObserver::with_writers(Vec::new(), Vec::new());

        observer.on_frame(&Frame {
            state: &state,
            assistant_id: Some(&id),
            thinking: &[],
        });
        observer.on_notice("Request cancelled");

        let (out, err) = observer.into_writers();
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "Here you go\n[cv.pdf] https://files/cv.pdf (application/pdf)\n"
        );
        assert_eq!(String::from_utf8(err).expect("utf8"), "! Request cancelled\n");
    }

    #[test]
    fn frames_without_assistant_are_silent() {
        let state = SessionState::new("001");
        let mut observer = TerminalObserver::with_writers(Vec::new(), Vec::new());
        observer.on_frame(&Frame {
            state: &state,
            assistant_id: None,
            thinking: &[],
        });
        let (out, err) = observer.into_writers();
        assert!(out.is_empty() && err.is_empty());
    }
}

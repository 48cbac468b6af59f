//! Byte stream → line stream → event stream.

use std::collections::VecDeque;

use futures::stream;
use futures::Stream;
use futures::StreamExt;
use ndchat_core::decode_line;
use ndchat_core::LineFramer;
use ndchat_core::StreamEvent;
use ndchat_core::TrailingFragment;

use crate::error::TransportError;
use crate::transport::ByteStream;

struct FrameState {
    bytes: ByteStream,
    framer: Option<LineFramer>,
    ready: VecDeque<String>,
}

/// Frames a response body into lines. A read error is yielded once and ends
/// the stream; the partial line at that point is discarded.
pub fn frame_lines(
    bytes: ByteStream,
    policy: TrailingFragment,
) -> impl Stream<Item = Result<String, TransportError>> + Send {
    let state = FrameState {
        bytes,
        framer: Some(LineFramer::new(policy)),
        ready: VecDeque::new(),
    };
    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.ready.pop_front() {
                return Some((Ok(line), state));
            }
            let framer = state.framer.as_mut()?;
            match state.bytes.next().await {
                Some(Ok(chunk)) => state.ready.extend(framer.push(&chunk)),
                Some(Err(err)) => {
                    state.framer = None;
                    return Some((Err(err), state));
                }
                None => {
                    let framer = state.framer.take()?;
                    state.ready.extend(framer.finish());
                }
            }
        }
    })
}

/// Drops lines the decoder rejects; transport errors pass through.
pub fn decode_events<S>(lines: S) -> impl Stream<Item = Result<StreamEvent, TransportError>> + Send
where
    S: Stream<Item = Result<String, TransportError>> + Send,
{
    lines.filter_map(|line| async move {
        match line {
            Ok(line) => decode_line(&line).map(Ok),
            Err(err) => Some(Err(err)),
        }
    })
}

pub fn event_stream(
    bytes: ByteStream,
    policy: TrailingFragment,
) -> impl Stream<Item = Result<StreamEvent, TransportError>> + Send {
    decode_events(frame_lines(bytes, policy))
}

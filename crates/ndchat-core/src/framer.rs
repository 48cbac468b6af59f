//! Newline framing for chunked byte streams.
//!
//! Chunks arrive however the transport slices them. The framer keeps raw
//! bytes until a `\n` shows up and only then decodes the line, so a UTF-8
//! sequence split across two chunks is reassembled before decoding. `\n`
//! never appears inside a multi-byte sequence, which makes the byte-level
//! split safe.

use serde::Deserialize;
use serde::Serialize;

/// What to do with bytes left after the final newline when the stream ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingFragment {
    /// An unterminated tail is an incomplete event and is discarded.
    #[default]
    Drop,
    /// Hand the unterminated tail out as one last line.
    Flush,
}

impl TrailingFragment {
    pub fn label(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Flush => "flush",
        }
    }
}

#[derive(Debug, Default)]
pub struct LineFramer {
    policy: TrailingFragment,
    buf: Vec<u8>,
}

impl LineFramer {
    pub fn new(policy: TrailingFragment) -> Self {
        Self {
            policy,
            buf: Vec::new(),
        }
    }

    /// Appends `chunk` and returns every line it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;
        while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
            self.buf.extend_from_slice(&rest[..pos]);
            lines.push(decode_line(&self.buf));
            self.buf.clear();
            rest = &rest[pos + 1..];
        }
        self.buf.extend_from_slice(rest);
        lines
    }

    /// Ends the stream. Returns the leftover fragment only under `Flush`.
    pub fn finish(self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        match self.policy {
            TrailingFragment::Drop => {
                tracing::trace!(bytes = self.buf.len(), "dropping unterminated trailing fragment");
                None
            }
            TrailingFragment::Flush => Some(decode_line(&self.buf)),
        }
    }

    /// Bytes held back for the line currently being assembled.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    pub fn policy(&self) -> TrailingFragment {
        self.policy
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("no response body")]
    NoBody,
    #[error("stream read error: {0}")]
    Stream(String),
}

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} has no file name", path.display())]
    MissingName { path: PathBuf },
}

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::contracts::OutgoingAttachment;
use crate::error::AttachmentError;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

pub fn encode_bytes(name: &str, content_type: &str, bytes: &[u8]) -> OutgoingAttachment {
    OutgoingAttachment {
        name: name.to_string(),
        content_type: content_type.to_string(),
        content: data_url(content_type, bytes),
    }
}

pub fn data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{content_type};base64,{}", STANDARD.encode(bytes))
}

pub async fn load_file(path: impl AsRef<Path>) -> Result<OutgoingAttachment, AttachmentError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| AttachmentError::MissingName {
            path: path.to_path_buf(),
        })?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| AttachmentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let content_type = guess_content_type(path);
    tracing::debug!(name, content_type, bytes = bytes.len(), "encoded attachment");
    Ok(encode_bytes(name, content_type, &bytes))
}

pub async fn load_files<P: AsRef<Path>>(
    paths: &[P],
) -> Result<Vec<OutgoingAttachment>, AttachmentError> {
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        out.push(load_file(path).await?);
    }
    Ok(out)
}

pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "json" => "application/json",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

//! Turns a user supplied file into something a provider request can carry inline.
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file the user picked, together with the media type it will be declared as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    path: PathBuf,
    media_type: String,
}

impl Attachment {
    /// Reference a file, inferring its media type from the extension
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let media_type = media_type_for(&path).to_string();
        Self { path, media_type }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedAttachment {
    pub encoded_body: String,
    pub media_type: String,
}

/// Media types for the kinds of study material we accept: images, pdfs and plain text
pub fn media_type_for(path: &Path) -> &'static str {
    let extension = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_lowercase(),
        None => return DEFAULT_MEDIA_TYPE,
    };

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" | "markdown" => "text/markdown",
        _ => DEFAULT_MEDIA_TYPE,
    }
}

pub fn encode_bytes(bytes: &[u8], media_type: impl Into<String>) -> EncodedAttachment {
    EncodedAttachment {
        encoded_body: BASE64.encode(bytes),
        media_type: media_type.into(),
    }
}

/// Read the attachment once and encode the whole of it, or fail without a partial result
pub async fn encode_file(attachment: &Attachment) -> Result<EncodedAttachment, EncodeError> {
    let bytes = tokio::fs::read(attachment.path())
        .await
        .map_err(|source| EncodeError::Read {
            path: attachment.path().to_path_buf(),
            source,
        })?;

    tracing::debug!(
        file = %attachment.path().display(),
        media_type = attachment.media_type(),
        bytes = bytes.len(),
        "encoded attachment"
    );
    Ok(encode_bytes(&bytes, attachment.media_type()))
}

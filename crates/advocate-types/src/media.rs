//! Media attachments carried alongside a query.
//!
//! Media travels as a data URI of the form `data:<mimetype>;base64,<data>`.
//! Only `image/*` and `video/*` MIME types are accepted; anything else is
//! rejected before it reaches the conversation runtime.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Why a media attachment was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("not a data URI")]
    NotDataUri,

    #[error("data URI is not base64-encoded")]
    NotBase64,

    #[error("unsupported media type '{0}' (expected image/* or video/*)")]
    UnsupportedType(String),

    #[error("invalid base64 payload: {0}")]
    InvalidPayload(String),
}

/// Broad media category, derived from the MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// A validated media attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    data_uri: String,
    mime_type: String,
    kind: MediaKind,
}

impl MediaAttachment {
    /// Validate a data URI.
    pub fn parse(data_uri: &str) -> Result<Self, MediaError> {
        let rest = data_uri.strip_prefix("data:").ok_or(MediaError::NotDataUri)?;
        let (header, payload) = rest.split_once(',').ok_or(MediaError::NotDataUri)?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or(MediaError::NotBase64)?
            .trim()
            .to_ascii_lowercase();

        let kind = kind_for(&mime_type)?;
        STANDARD
            .decode(payload.trim())
            .map_err(|e| MediaError::InvalidPayload(e.to_string()))?;

        Ok(Self {
            data_uri: data_uri.to_string(),
            mime_type,
            kind,
        })
    }

    /// Encode raw bytes into a data URI attachment.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Result<Self, MediaError> {
        let mime_type = mime_type.trim().to_ascii_lowercase();
        let kind = kind_for(&mime_type)?;
        let data_uri = format!("data:{mime_type};base64,{}", STANDARD.encode(bytes));
        Ok(Self {
            data_uri,
            mime_type,
            kind,
        })
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}

fn kind_for(mime_type: &str) -> Result<MediaKind, MediaError> {
    let subtype_present = |prefix: &str| {
        mime_type
            .strip_prefix(prefix)
            .is_some_and(|sub| !sub.is_empty())
    };
    if subtype_present("image/") {
        Ok(MediaKind::Image)
    } else if subtype_present("video/") {
        Ok(MediaKind::Video)
    } else {
        Err(MediaError::UnsupportedType(mime_type.to_string()))
    }
}

//! Attachment types and data structures.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hash::ContentHash;

/// Part headers captured from an upload, keyed by header name.
///
/// Ordered so that the encoded blob is deterministic.
pub type HeaderMap = BTreeMap<String, Vec<String>>;

/// A file as received from the client, before the service stamps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttachment {
    /// Client-supplied filename.
    pub filename: String,
    /// Part headers, preserved verbatim.
    pub metadata: HeaderMap,
    /// Size declared by the client.
    pub size: u64,
    /// File contents.
    pub content: Bytes,
}

impl RawAttachment {
    /// Create an upload whose declared size is the content length.
    #[must_use]
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            filename: filename.into(),
            metadata: HeaderMap::new(),
            size: content.len() as u64,
            content,
        }
    }

    /// Add a part header value.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }
}

/// An attachment as stored in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Filename with surrounding whitespace trimmed.
    pub filename: String,
    /// Part headers, preserved verbatim.
    pub metadata: HeaderMap,
    /// Size declared by the client.
    pub size: u64,
    /// Assigned by the service when the upload was received.
    pub modified_at: DateTime<Utc>,
    /// File contents.
    pub content: Bytes,
}

impl Attachment {
    /// Stamp a raw upload with its modification time.
    #[must_use]
    pub fn from_upload(upload: RawAttachment, modified_at: DateTime<Utc>) -> Self {
        Self {
            filename: upload.filename.trim().to_string(),
            metadata: upload.metadata,
            size: upload.size,
            modified_at,
            content: upload.content,
        }
    }

    /// First `Content-Type` header value, matched case-insensitively.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

/// A `(filename, key)` pair recorded on a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    /// Trimmed filename.
    pub filename: String,
    /// Object store key of the encoded attachment.
    pub key: ContentHash,
}

impl AttachmentRef {
    /// Create a new attachment reference.
    #[must_use]
    pub fn new(filename: impl Into<String>, key: ContentHash) -> Self {
        Self {
            filename: filename.into(),
            key,
        }
    }

    /// Persisted form: `filename/hexkey`.
    #[must_use]
    pub fn to_pair(&self) -> String {
        format!("{}/{}", self.filename, self.key)
    }

    /// Parse the persisted form.
    ///
    /// Splits at the last `/`, so filenames containing slashes survive.
    #[must_use]
    pub fn parse_pair(pair: &str) -> Option<Self> {
        let (filename, key) = pair.rsplit_once('/')?;
        Some(Self {
            filename: filename.to_string(),
            key: key.parse().ok()?,
        })
    }
}

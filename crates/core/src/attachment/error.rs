//! Attachment codec error types.

use thiserror::Error;

/// Attachment blob encoding and decoding errors.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Blob has no bytes at all.
    #[error("attachment blob is empty")]
    Empty,

    /// Blob was written by an unknown format version.
    #[error("unsupported attachment blob version {0}")]
    UnsupportedVersion(u8),

    /// Blob is truncated, corrupted, or not an attachment.
    #[error("corrupt attachment blob: {0}")]
    Corrupt(#[source] bincode::Error),

    /// Attachment could not be serialized.
    #[error("failed to encode attachment: {0}")]
    Encode(#[source] bincode::Error),
}

//! Submission error types.

use hashdrop_shared::AppError;
use thiserror::Error;

use crate::attachment::CodecError;
use crate::hash::HashFormatError;
use crate::storage::StorageError;

/// Why a stored attachment could not be returned.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// The key is not a full content hash.
    #[error(transparent)]
    InvalidKey(#[from] HashFormatError),

    /// The object store could not produce the blob.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The blob was fetched but does not decode.
    #[error(transparent)]
    Decode(#[from] CodecError),
}

/// Errors from submission operations.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Neither a body nor any attachment was supplied.
    #[error("submission must contain a body or at least one attachment")]
    Empty,

    /// Combined attachment size exceeds the configured limit.
    #[error("upload of {size} bytes exceeds the limit of {max} bytes")]
    TooLarge {
        /// Combined size of the attachments.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Hash or prefix text is malformed.
    #[error("invalid hash: {0}")]
    InvalidHash(#[from] HashFormatError),

    /// No submission matches the prefix.
    #[error("submission {0} not found")]
    NotFound(String),

    /// The attachment could not be fetched or decoded.
    #[error("attachment {key} is unavailable: {cause}")]
    AttachmentUnavailable {
        /// Object key that was requested.
        key: String,
        /// Underlying failure.
        #[source]
        cause: FetchFailure,
    },

    /// An attachment could not be encoded.
    #[error("attachment {filename:?} could not be encoded: {cause}")]
    Encode {
        /// Filename of the attachment.
        filename: String,
        /// Underlying failure.
        #[source]
        cause: CodecError,
    },

    /// An attachment could not be written to the object store.
    #[error("attachment {filename:?} could not be stored: {cause}")]
    Upload {
        /// Filename of the attachment.
        filename: String,
        /// Underlying failure.
        #[source]
        cause: StorageError,
    },

    /// A uniqueness rule was violated in a way that is not a duplicate submission.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Database failure.
    #[error("repository error: {0}")]
    Repository(String),
}

impl SubmissionError {
    /// Create a not-found error for a hash or prefix.
    pub fn not_found(prefix: impl Into<String>) -> Self {
        Self::NotFound(prefix.into())
    }

    /// Create a repository error.
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Create an unavailable-attachment error.
    pub fn unavailable(key: impl Into<String>, cause: impl Into<FetchFailure>) -> Self {
        Self::AttachmentUnavailable {
            key: key.into(),
            cause: cause.into(),
        }
    }
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match &err {
            SubmissionError::Empty => Self::Validation(err.to_string()),
            SubmissionError::TooLarge { .. } => Self::PayloadTooLarge(err.to_string()),
            SubmissionError::InvalidHash(_) => Self::InvalidInput(err.to_string()),
            SubmissionError::NotFound(_) => Self::NotFound(err.to_string()),
            // The cause stays server-side.
            SubmissionError::AttachmentUnavailable { key, .. } => {
                Self::NotFound(format!("attachment {key} not found"))
            }
            SubmissionError::Conflict(_) => Self::Conflict(err.to_string()),
            SubmissionError::Upload { .. } => Self::ExternalService(err.to_string()),
            SubmissionError::Encode { .. } => Self::Internal(err.to_string()),
            SubmissionError::Repository(_) => Self::Database(err.to_string()),
        }
    }
}

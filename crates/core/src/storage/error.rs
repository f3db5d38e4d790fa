//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The configured bucket does not exist.
    #[error("bucket does not exist: {bucket}")]
    BucketNotFound {
        /// Bucket name.
        bucket: String,
    },

    /// Object could not be fetched, whether missing or unreachable.
    #[error("object {key} unavailable: {reason}")]
    ObjectUnavailable {
        /// Storage key.
        key: String,
        /// Underlying cause.
        reason: String,
    },

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// OpenDAL operation error.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a bucket not found error.
    #[must_use]
    pub fn bucket_not_found(bucket: impl Into<String>) -> Self {
        Self::BucketNotFound {
            bucket: bucket.into(),
        }
    }

    /// Create an object unavailable error.
    #[must_use]
    pub fn unavailable(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::ObjectUnavailable {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::ConfigInvalid => Self::Configuration(err.to_string()),
            _ => Self::Operation(err.to_string()),
        }
    }
}

//! Submission types and the composite hash.

use chrono::{DateTime, Utc};

use crate::attachment::AttachmentRef;
use crate::hash::ContentHash;

/// Input for persisting a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    /// Composite content hash.
    pub hash: ContentHash,
    /// Plaintext body.
    pub body: String,
    /// Attachment references in submission order.
    pub attachments: Vec<AttachmentRef>,
    /// Unix timestamp in seconds.
    pub created_at: i64,
}

/// A persisted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Row identifier, used as the prefix tie-break.
    pub id: i64,
    /// Composite content hash.
    pub hash: ContentHash,
    /// Plaintext body.
    pub body: String,
    /// Attachment references in submission order.
    pub attachments: Vec<AttachmentRef>,
    /// Unix timestamp in seconds.
    pub created_at: i64,
}

impl Submission {
    /// Creation time as a UTC datetime.
    #[must_use]
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }
}

/// Result of an insert: a content-identical row may already exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Created(ContentHash),
    /// A row with this hash was already present.
    AlreadyExists(ContentHash),
}

impl InsertOutcome {
    /// The resolved hash, whichever way the insert went.
    #[must_use]
    pub fn hash(&self) -> &ContentHash {
        match self {
            Self::Created(hash) | Self::AlreadyExists(hash) => hash,
        }
    }

    /// Whether a new row was written.
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResult {
    /// Full submission hash.
    pub hash: ContentHash,
    /// False when an identical submission already existed.
    pub created: bool,
}

impl SubmitResult {
    /// Public short id (first 10 hex characters).
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.hash.short()
    }
}

/// Hash of the body followed by every `filename/key` pair, in order.
#[must_use]
pub fn submission_hash(body: &str, attachments: &[AttachmentRef]) -> ContentHash {
    let pairs = attachments.iter().map(AttachmentRef::to_pair);
    ContentHash::digest_parts(std::iter::once(body.to_string()).chain(pairs))
}

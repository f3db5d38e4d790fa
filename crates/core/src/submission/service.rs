//! Submission service: stores attachments, persists submissions, resolves
//! short ids.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future;
use hashdrop_shared::UploadConfig;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use super::error::SubmissionError;
use super::types::{InsertOutcome, NewSubmission, Submission, SubmitResult, submission_hash};
use crate::attachment::{self, Attachment, AttachmentRef, RawAttachment};
use crate::hash::{ContentHash, HashFormatError, HashPrefix};
use crate::storage::ObjectStore;

/// Persistence for submission records.
pub trait SubmissionRepository: Send + Sync {
    /// Insert a submission, reporting an existing row with the same hash
    /// as [`InsertOutcome::AlreadyExists`] instead of an error.
    fn insert(
        &self,
        submission: NewSubmission,
    ) -> impl Future<Output = Result<InsertOutcome, SubmissionError>> + Send;

    /// Find the submission with the lowest id whose hash starts with `prefix`.
    fn find_by_prefix(
        &self,
        prefix: &HashPrefix,
    ) -> impl Future<Output = Result<Option<Submission>, SubmissionError>> + Send;
}

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Upload limits applied by [`SubmissionService::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionLimits {
    /// Combined attachment bytes accepted per submission.
    pub max_upload_size: usize,
    /// Attachments uploaded concurrently.
    pub attachment_concurrency: usize,
}

impl Default for SubmissionLimits {
    fn default() -> Self {
        Self::from(&UploadConfig::default())
    }
}

impl From<&UploadConfig> for SubmissionLimits {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_upload_size: config.max_upload_size,
            attachment_concurrency: config.attachment_concurrency.max(1),
        }
    }
}

/// Submission service orchestrating storage and persistence.
pub struct SubmissionService<R, S> {
    repo: Arc<R>,
    store: Arc<S>,
    limits: SubmissionLimits,
    clock: Clock,
}

impl<R, S> SubmissionService<R, S>
where
    R: SubmissionRepository,
    S: ObjectStore,
{
    /// Create a new submission service.
    pub fn new(repo: Arc<R>, store: Arc<S>) -> Self {
        Self {
            repo,
            store,
            limits: SubmissionLimits::default(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the upload limits.
    #[must_use]
    pub fn with_limits(mut self, limits: SubmissionLimits) -> Self {
        self.limits = SubmissionLimits {
            attachment_concurrency: limits.attachment_concurrency.max(1),
            ..limits
        };
        self
    }

    /// Replace the clock used to stamp attachments and records.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Current limits.
    #[must_use]
    pub fn limits(&self) -> SubmissionLimits {
        self.limits
    }

    /// Store a submission and its attachments.
    ///
    /// Attachments are uploaded before the record is written, so a failed
    /// upload never leaves a record pointing at a missing blob. Blobs that
    /// were uploaded before the failure stay in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the submission is empty or too large, or if any
    /// attachment upload or the insert fails.
    pub async fn submit(
        &self,
        body: String,
        attachments: Vec<RawAttachment>,
    ) -> Result<SubmitResult, SubmissionError> {
        if body.trim().is_empty() && attachments.is_empty() {
            return Err(SubmissionError::Empty);
        }

        let size = attachments
            .iter()
            .fold(0usize, |acc, a| acc.saturating_add(a.content.len()));
        if size > self.limits.max_upload_size {
            return Err(SubmissionError::TooLarge {
                size,
                max: self.limits.max_upload_size,
            });
        }

        let now = (self.clock)();
        let permits = Semaphore::new(self.limits.attachment_concurrency);
        let uploads = attachments
            .into_iter()
            .map(|upload| self.store_attachment(upload, now, &permits));
        let refs = future::try_join_all(uploads).await?;

        let hash = submission_hash(&body, &refs);
        let attachment_count = refs.len();
        let outcome = self
            .repo
            .insert(NewSubmission {
                hash,
                body,
                attachments: refs,
                created_at: now.timestamp(),
            })
            .await?;

        let created = outcome.is_created();
        let hash = match outcome {
            InsertOutcome::Created(hash) | InsertOutcome::AlreadyExists(hash) => hash,
        };
        info!(
            id = hash.short(),
            attachments = attachment_count,
            created,
            "Submission stored"
        );

        Ok(SubmitResult { hash, created })
    }

    /// Encode one attachment and put it under its content key.
    async fn store_attachment(
        &self,
        upload: RawAttachment,
        now: DateTime<Utc>,
        permits: &Semaphore,
    ) -> Result<AttachmentRef, SubmissionError> {
        let _permit = permits.acquire().await.ok();

        let attachment = Attachment::from_upload(upload, now);
        let blob = attachment::encode(&attachment).map_err(|cause| SubmissionError::Encode {
            filename: attachment.filename.clone(),
            cause,
        })?;
        let key = attachment::key_for(&blob);

        if let Err(cause) = self.store.put(key.as_str(), blob).await {
            error!(
                error = %cause,
                filename = %attachment.filename,
                key = %key,
                "Failed to store attachment"
            );
            return Err(SubmissionError::Upload {
                filename: attachment.filename,
                cause,
            });
        }

        debug!(filename = %attachment.filename, key = %key, "Attachment stored");
        Ok(AttachmentRef::new(attachment.filename, key))
    }

    /// Resolve a full hash or a prefix of at least 10 hex characters.
    ///
    /// When several hashes share the prefix, the oldest record wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed or nothing matches.
    pub async fn resolve(&self, hash_or_prefix: &str) -> Result<Submission, SubmissionError> {
        let prefix = HashPrefix::parse(hash_or_prefix)?;
        self.repo
            .find_by_prefix(&prefix)
            .await?
            .ok_or_else(|| SubmissionError::not_found(prefix.as_str()))
    }

    /// Fetch and decode a stored attachment.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::AttachmentUnavailable`] if the key is not
    /// a full hash, or if the blob cannot be fetched or decoded.
    pub async fn fetch_attachment(&self, key: &str) -> Result<Attachment, SubmissionError> {
        let key: ContentHash = key.parse().map_err(|e: HashFormatError| {
            debug!(error = %e, key, "Malformed attachment key");
            SubmissionError::unavailable(key, e)
        })?;

        let blob = self.store.get(key.as_str()).await.map_err(|e| {
            warn!(error = %e, key = %key, "Attachment fetch failed");
            SubmissionError::unavailable(key.as_str(), e)
        })?;

        attachment::decode(&blob).map_err(|e| {
            warn!(error = %e, key = %key, "Attachment blob does not decode");
            SubmissionError::unavailable(key.as_str(), e)
        })
    }
}

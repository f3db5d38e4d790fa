//! In-memory fakes for submission tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};

use super::error::SubmissionError;
use super::service::{SubmissionRepository, SubmissionService};
use super::types::{InsertOutcome, NewSubmission, Submission};
use crate::hash::HashPrefix;
use crate::storage::{ObjectStore, StorageConfig, StorageError, StorageProvider, StorageService};

/// Repository backed by a vector; ids are assigned sequentially.
#[derive(Default)]
pub(crate) struct MemoryRepository {
    rows: Mutex<Vec<Submission>>,
}

impl MemoryRepository {
    pub(crate) fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl SubmissionRepository for MemoryRepository {
    async fn insert(&self, submission: NewSubmission) -> Result<InsertOutcome, SubmissionError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|row| row.hash == submission.hash) {
            return Ok(InsertOutcome::AlreadyExists(submission.hash));
        }

        let id = i64::try_from(rows.len()).unwrap() + 1;
        rows.push(Submission {
            id,
            hash: submission.hash.clone(),
            body: submission.body,
            attachments: submission.attachments,
            created_at: submission.created_at,
        });
        Ok(InsertOutcome::Created(submission.hash))
    }

    async fn find_by_prefix(
        &self,
        prefix: &HashPrefix,
    ) -> Result<Option<Submission>, SubmissionError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| row.hash.starts_with(prefix))
            .min_by_key(|row| row.id)
            .cloned())
    }
}

/// Memory-backed store that can fail its n-th `put`.
pub(crate) struct FlakyStore {
    inner: StorageService,
    fail_on: Option<usize>,
    puts: AtomicUsize,
    stored: AtomicUsize,
}

impl FlakyStore {
    pub(crate) fn new() -> Self {
        Self {
            inner: StorageService::from_config(StorageConfig::new(StorageProvider::Memory))
                .unwrap(),
            fail_on: None,
            puts: AtomicUsize::new(0),
            stored: AtomicUsize::new(0),
        }
    }

    /// Fail the `n`-th put (1-based).
    pub(crate) fn failing_on(n: usize) -> Self {
        Self {
            fail_on: Some(n),
            ..Self::new()
        }
    }

    /// Number of put attempts.
    pub(crate) fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of successful puts.
    pub(crate) fn stored(&self) -> usize {
        self.stored.load(Ordering::SeqCst)
    }
}

impl ObjectStore for FlakyStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<String, StorageError> {
        let attempt = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(attempt) {
            return Err(StorageError::operation("injected failure"));
        }
        let key = self.inner.put(key, data).await?;
        self.stored.fetch_add(1, Ordering::SeqCst);
        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        self.inner.get(key).await
    }
}

pub(crate) fn fixed_clock() -> impl Fn() -> DateTime<Utc> + Send + Sync + Clone + 'static {
    || Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Service over a fresh repository and `store`, with a fixed clock.
pub(crate) fn service(store: FlakyStore) -> SubmissionService<MemoryRepository, FlakyStore> {
    SubmissionService::new(Arc::new(MemoryRepository::default()), Arc::new(store))
        .with_clock(fixed_clock())
}

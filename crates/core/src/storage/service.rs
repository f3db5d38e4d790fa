//! Storage service implementation using Apache OpenDAL.

use std::future::Future;

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use tracing::{debug, error, warn};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Key-addressed blob storage.
///
/// Implemented by [`StorageService`]; tests substitute their own.
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, returning the key.
    fn put(
        &self,
        key: &str,
        data: Bytes,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Fetch the complete object stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Bytes, StorageError>> + Send;
}

/// Object storage for encoded attachment blobs.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::Memory => Ok(Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish()),
        }
    }

    /// Poll until `key` is visible, bounded by the confirmation timeout.
    ///
    /// Failure to confirm is logged, never returned: the write itself
    /// already succeeded.
    async fn confirm_exists(&self, key: &str) {
        let wait = async {
            loop {
                match self.operator.stat(key).await {
                    Ok(_) => return Ok(()),
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        tokio::time::sleep(self.config.confirm_poll_interval).await;
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        match tokio::time::timeout(self.config.confirm_timeout, wait).await {
            Ok(Ok(())) => debug!(key, bucket = self.bucket(), "Object confirmed"),
            Ok(Err(e)) => warn!(
                key,
                bucket = self.bucket(),
                error = %e,
                "Failed attempt to wait for object to exist"
            ),
            Err(_) => warn!(
                key,
                bucket = self.bucket(),
                timeout_secs = self.config.confirm_timeout.as_secs(),
                "Timed out waiting for object to exist"
            ),
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }
}

impl ObjectStore for StorageService {
    async fn put(&self, key: &str, data: Bytes) -> Result<String, StorageError> {
        let size = data.len();
        let written = if self.config.is_multipart(size) {
            self.operator
                .write_with(key, data)
                .chunk(self.config.part_size)
                .concurrent(self.config.concurrency)
                .await
        } else {
            self.operator.write(key, data).await
        };

        if let Err(err) = written {
            return Err(classify_write_error(self.bucket(), key, &err));
        }

        debug!(key, size, "Object uploaded");
        self.confirm_exists(key).await;
        Ok(key.to_string())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        let buffer = self
            .operator
            .read_with(key)
            .chunk(self.config.part_size)
            .concurrent(self.config.concurrency)
            .await
            .map_err(|e| StorageError::unavailable(key, e))?;

        Ok(buffer.to_bytes())
    }
}

/// A write can only report `NotFound` when the bucket itself is missing.
fn classify_write_error(bucket: &str, key: &str, err: &opendal::Error) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        error!(bucket, key, "Bucket does not exist");
        StorageError::bucket_not_found(bucket)
    } else {
        StorageError::operation(format!("upload of {key} failed: {err}"))
    }
}

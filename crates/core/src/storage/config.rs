//! Storage configuration types.

use std::time::Duration;

pub use hashdrop_shared::config::StorageProvider;
use hashdrop_shared::config::StorageSettings;

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Payloads larger than this are transferred in parts of this size.
    pub part_size: usize,
    /// Number of parts transferred concurrently.
    pub concurrency: usize,
    /// Upper bound on waiting for an uploaded object to become visible.
    pub confirm_timeout: Duration,
    /// Delay between existence checks while confirming.
    pub confirm_poll_interval: Duration,
}

impl StorageConfig {
    /// Default part size: 8MB.
    pub const DEFAULT_PART_SIZE: usize = 8 * 1024 * 1024;
    /// Default part concurrency.
    pub const DEFAULT_CONCURRENCY: usize = 4;
    /// Default confirmation timeout: 1 minute.
    pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);
    /// Default confirmation poll interval.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            part_size: Self::DEFAULT_PART_SIZE,
            concurrency: Self::DEFAULT_CONCURRENCY,
            confirm_timeout: Self::DEFAULT_CONFIRM_TIMEOUT,
            confirm_poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    /// Build from loaded application settings.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(settings.provider.clone())
            .with_part_size(settings.part_size)
            .with_concurrency(settings.concurrency)
            .with_confirm_timeout(Duration::from_secs(settings.confirm_timeout_secs))
    }

    /// Set the multi-part size. Zero is clamped to one byte.
    #[must_use]
    pub fn with_part_size(mut self, size: usize) -> Self {
        self.part_size = size.max(1);
        self
    }

    /// Set part concurrency. Zero is clamped to one.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the confirmation timeout.
    #[must_use]
    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Set the confirmation poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.confirm_poll_interval = interval;
        self
    }

    /// Whether a payload of `size` bytes is sent in parts.
    #[must_use]
    pub fn is_multipart(&self, size: usize) -> bool {
        size > self.part_size
    }
}

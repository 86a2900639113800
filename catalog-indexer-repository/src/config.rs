//! Configuration types for the index client.

use std::time::Duration;

/// Configuration for an index client connection.
#[derive(Debug, Clone)]
pub struct IndexClientConfig {
    /// Per-request timeout. Requests exceeding it fail with `IndexError::Timeout`.
    /// Set to None to rely on the transport default.
    pub request_timeout: Option<Duration>,
    /// Maximum number of documents sent in a single bulk request. Larger
    /// batches are split into several requests.
    pub max_bulk_size: usize,
}

impl Default for IndexClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(10)),
            max_bulk_size: 1000,
        }
    }
}

impl IndexClientConfig {
    /// Create a config with a custom request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Create a config with a custom bulk request size limit.
    ///
    /// A limit of zero is treated as one.
    pub fn with_max_bulk_size(mut self, max_bulk_size: usize) -> Self {
        self.max_bulk_size = max_bulk_size.max(1);
        self
    }
}

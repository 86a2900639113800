//! Settings read from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::telemetry::LogFormat;
use crate::IndexingError;
use catalog_indexer_pipeline::{RetryPolicy, SyncConfig};
use catalog_indexer_repository::{IndexClientConfig, IndexConfig};

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default alias documents are written through.
const DEFAULT_INDEX_ALIAS: &str = "items";

/// Default per-request timeout in milliseconds.
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Runtime settings for the indexer.
#[derive(Debug, Clone)]
pub struct Settings {
    pub opensearch_url: String,
    pub index: IndexConfig,
    pub client: IndexClientConfig,
    pub sync: SyncConfig,
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `CATALOG_INDEX_ALIAS`: Index alias (default: items)
    /// - `CATALOG_INDEX_VERSION`: Physical index version (default: 0)
    /// - `OPENSEARCH_REQUEST_TIMEOUT_MS`: Per-request timeout (default: 10000)
    /// - `SYNC_BATCH_SIZE`: Records per batch (default: 100)
    /// - `SYNC_MAX_ATTEMPTS`: Write attempts per document (default: 3)
    /// - `SYNC_INITIAL_BACKOFF_MS`: First retry delay (default: 100)
    /// - `SYNC_MAX_BACKOFF_MS`: Retry delay cap (default: 5000)
    /// - `SYNC_MAX_CONCURRENT_BATCHES`: Batches in flight (default: 1)
    /// - `LOG_FORMAT`: `json` or `text` (default: text)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable
    /// if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SyncConfig::default();

        let opensearch_url =
            lookup("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());
        let alias =
            lookup("CATALOG_INDEX_ALIAS").unwrap_or_else(|| DEFAULT_INDEX_ALIAS.to_string());
        let version = parse_or(&lookup, "CATALOG_INDEX_VERSION", 0u32)?;
        let timeout_ms = parse_or(&lookup, "OPENSEARCH_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?;

        let sync = SyncConfig {
            batch_size: parse_or(&lookup, "SYNC_BATCH_SIZE", defaults.batch_size)?,
            max_concurrent_batches: parse_or(
                &lookup,
                "SYNC_MAX_CONCURRENT_BATCHES",
                defaults.max_concurrent_batches,
            )?,
            retry: RetryPolicy {
                max_attempts: parse_or(&lookup, "SYNC_MAX_ATTEMPTS", defaults.retry.max_attempts)?,
                initial_backoff: Duration::from_millis(parse_or(
                    &lookup,
                    "SYNC_INITIAL_BACKOFF_MS",
                    defaults.retry.initial_backoff.as_millis() as u64,
                )?),
                max_backoff: Duration::from_millis(parse_or(
                    &lookup,
                    "SYNC_MAX_BACKOFF_MS",
                    defaults.retry.max_backoff.as_millis() as u64,
                )?),
            },
        };
        sync.validate()
            .map_err(|e| IndexingError::config(e.to_string()))?;

        let log_format = parse_or(&lookup, "LOG_FORMAT", LogFormat::default())?;

        Ok(Self {
            opensearch_url,
            index: IndexConfig::new(alias, version),
            client: IndexClientConfig::default()
                .with_request_timeout(Duration::from_millis(timeout_ms))
                .with_max_bulk_size(sync.batch_size),
            sync,
            log_format,
        })
    }
}

/// Parse variable `key`, falling back to `default` when it is unset.
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, IndexingError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| IndexingError::config(format!("Invalid {} {:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}

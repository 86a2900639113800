//! Index error types.
//!
//! This module defines the errors a document index operation can fail with and
//! how HTTP-level failures are classified into them.

use thiserror::Error;

/// Errors that can occur during document index operations.
///
/// `ConnectionFailure` and `Timeout` are transient and worth retrying;
/// `Rejected` means the index refused the request and a retry would fail the
/// same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The search engine could not be reached or answered with a transient
    /// server-side failure.
    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    /// The request was refused (validation, mapping or serialization problem).
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The request did not complete in time.
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl IndexError {
    /// Create a connection failure.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionFailure(msg.into())
    }

    /// Create a rejection.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create a timeout.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Classify a non-success HTTP status returned by the search engine.
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = format!("status {}: {}", status, detail.into());
        match status {
            408 | 504 => Self::Timeout(detail),
            429 | 500..=599 => Self::ConnectionFailure(detail),
            _ => Self::Rejected(detail),
        }
    }

    /// Whether the failed operation may succeed if attempted again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionFailure(_) | Self::Timeout(_) => true,
            Self::Rejected(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(IndexError::from_status(408, ""), IndexError::Timeout(_)));
        assert!(matches!(IndexError::from_status(504, ""), IndexError::Timeout(_)));
        assert!(matches!(
            IndexError::from_status(429, "too many requests"),
            IndexError::ConnectionFailure(_)
        ));
        assert!(matches!(
            IndexError::from_status(503, ""),
            IndexError::ConnectionFailure(_)
        ));
        assert!(matches!(
            IndexError::from_status(400, "mapper_parsing_exception"),
            IndexError::Rejected(_)
        ));
        assert!(matches!(IndexError::from_status(409, ""), IndexError::Rejected(_)));
    }

    #[test]
    fn test_retryable() {
        assert!(IndexError::connection("refused").is_retryable());
        assert!(IndexError::timeout("slow").is_retryable());
        assert!(!IndexError::rejected("bad field").is_retryable());
    }

    #[test]
    fn test_status_detail_in_message() {
        let err = IndexError::from_status(400, "bad price");
        assert_eq!(err.to_string(), "Rejected: status 400: bad price");
    }
}

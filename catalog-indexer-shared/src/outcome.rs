//! Per-record results of a sync pass.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What happened to one record during a sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SyncStatus {
    /// The document was written to the index.
    Success,
    /// The write failed permanently or ran out of retries.
    Failed(String),
    /// The record was deliberately not written.
    Skipped(String),
}

/// Outcome of syncing a single catalog record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    /// Identifier of the record this outcome belongs to.
    pub id: String,
    #[serde(flatten)]
    pub status: SyncStatus,
    /// Number of write attempts made; zero for skipped records.
    pub attempts: u32,
    /// When the outcome was decided.
    pub timestamp: DateTime<Utc>,
}

impl SyncOutcome {
    pub fn success(id: impl Into<String>, attempts: u32) -> Self {
        Self::with_status(id, SyncStatus::Success, attempts)
    }

    pub fn failed(id: impl Into<String>, reason: impl Into<String>, attempts: u32) -> Self {
        Self::with_status(id, SyncStatus::Failed(reason.into()), attempts)
    }

    pub fn skipped(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::with_status(id, SyncStatus::Skipped(reason.into()), 0)
    }

    fn with_status(id: impl Into<String>, status: SyncStatus, attempts: u32) -> Self {
        Self {
            id: id.into(),
            status,
            attempts,
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, SyncStatus::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, SyncStatus::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, SyncStatus::Skipped(_))
    }
}

/// Aggregate counts over the outcomes of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SyncSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SyncSummary {
    pub fn from_outcomes(outcomes: &[SyncOutcome]) -> Self {
        outcomes.iter().fold(
            Self {
                total: outcomes.len(),
                ..Default::default()
            },
            |mut summary, outcome| {
                match outcome.status {
                    SyncStatus::Success => summary.succeeded += 1,
                    SyncStatus::Failed(_) => summary.failed += 1,
                    SyncStatus::Skipped(_) => summary.skipped += 1,
                }
                summary
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let outcomes = vec![
            SyncOutcome::success("1", 1),
            SyncOutcome::failed("2", "rejected", 1),
            SyncOutcome::skipped("3", "sync cancelled"),
            SyncOutcome::success("4", 2),
        ];

        let summary = SyncSummary::from_outcomes(&outcomes);

        assert_eq!(
            summary,
            SyncSummary {
                total: 4,
                succeeded: 2,
                failed: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn test_outcome_serializes_flat() {
        let outcome = SyncOutcome::failed("9", "Timeout: took too long", 3);
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["id"], "9");
        assert_eq!(value["status"], "failed");
        assert_eq!(value["reason"], "Timeout: took too long");
        assert_eq!(value["attempts"], 3);
    }
}

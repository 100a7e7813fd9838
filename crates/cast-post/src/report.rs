use chrono::Utc;
use serde::{Deserialize, Serialize};

use cast_core::CastError;

/// A case whose statistic could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFailure {
    /// Row of the case in the result table.
    pub index: usize,
    /// Case identifier or result stem.
    pub case: String,
    /// Stable error code of the failure.
    pub code: String,
    pub message: String,
}

impl CaseFailure {
    pub(crate) fn new(index: usize, case: impl Into<String>, err: &CastError) -> Self {
        Self {
            index,
            case: case.into(),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Outcome of one batch over the selected cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Statistic label or operation name.
    pub label: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<CaseFailure>,
    /// RFC 3339 completion time.
    pub created_at: String,
}

impl BatchReport {
    pub(crate) fn new(label: impl Into<String>, total: usize, failed: Vec<CaseFailure>) -> Self {
        Self {
            label: label.into(),
            total,
            succeeded: total - failed.len(),
            failed,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Whether every case succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Count of failures per error code, in first-seen order.
    pub fn failure_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for failure in &self.failed {
            match counts.iter_mut().find(|(code, _)| *code == failure.code) {
                Some((_, count)) => *count += 1,
                None => counts.push((&failure.code, 1)),
            }
        }
        counts
    }
}

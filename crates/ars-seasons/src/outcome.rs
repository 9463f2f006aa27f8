use std::fmt;

use crate::error::{FailureKind, SeasonError};

/// Whether an operation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The operation took effect.
    Success,
    /// The operation was rejected or failed.
    Failure(FailureKind),
}

/// A structured result for display: the kind plus a readable summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    /// Success or the category of failure.
    pub kind: OutcomeKind,
    /// What happened.
    pub summary: String,
}

impl OperationOutcome {
    /// A successful outcome.
    pub fn success(summary: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Success,
            summary: summary.into(),
        }
    }

    /// The outcome of a failed operation.
    pub fn failure(error: &SeasonError) -> Self {
        Self {
            kind: OutcomeKind::Failure(error.kind()),
            summary: error.to_string(),
        }
    }

    /// Build an outcome from a result, describing the success value with
    /// `describe`.
    pub fn from_result<T>(result: &Result<T, SeasonError>, describe: impl FnOnce(&T) -> String) -> Self {
        match result {
            Ok(value) => Self::success(describe(value)),
            Err(error) => Self::failure(error),
        }
    }

    /// Returns true for a successful outcome.
    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OutcomeKind::Success => write!(f, "ok: {}", self.summary),
            OutcomeKind::Failure(kind) => write!(f, "{kind:?}: {}", self.summary),
        }
    }
}

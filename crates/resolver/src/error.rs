use std::time::Duration;

use thiserror::Error;

/// Why a single candidate did not produce a value.
///
/// Candidate errors never escape the resolver; they are logged and collected
/// into the [`Resolution`](crate::Resolution) for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateError {
    /// The candidate did not finish within its own deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The candidate ran but reported an error (network, parse, device...).
    #[error("failed: {0}")]
    Failed(String),

    /// The candidate succeeded but had nothing useful to return.
    #[error("returned no usable value")]
    Empty,
}

impl CandidateError {
    /// Convenience constructor for [`CandidateError::Failed`].
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self::Failed(reason.to_string())
    }
}

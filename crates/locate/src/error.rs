use thiserror::Error;
use vigil_resolver::CandidateError;

/// Errors raised by a single location source.
///
/// These never reach the report assembler: each source runs as a resolver
/// candidate and its error is converted into a [`CandidateError`].
#[derive(Debug, Error)]
pub enum LookupError {
    /// Connecting to or reading from a local sensor failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An HTTP transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The lookup service answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The response body was not the JSON we expected.
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The service reported a failure in its response body.
    #[error("service error: {0}")]
    Service(String),

    /// A required field was missing or empty.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// The sensor closed the stream before reporting a usable fix.
    #[error("no position fix reported")]
    NoFix,
}

impl From<LookupError> for CandidateError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::MissingField(_) | LookupError::NoFix => CandidateError::Empty,
            other => CandidateError::failed(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_answers_map_to_empty_candidates() {
        assert_eq!(
            CandidateError::from(LookupError::MissingField("ip")),
            CandidateError::Empty
        );
        assert_eq!(CandidateError::from(LookupError::NoFix), CandidateError::Empty);
    }

    #[test]
    fn transport_errors_map_to_failed_candidates() {
        let err = CandidateError::from(LookupError::Status(503));
        assert_eq!(err, CandidateError::Failed("unexpected status 503".into()));
    }
}

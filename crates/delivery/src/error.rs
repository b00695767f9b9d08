use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while delivering a rendered report.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The remote side did not respond within the allowed duration.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// The remote side refused the message.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The client was given invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The outgoing message could not be built.
    #[error("failed to build message: {0}")]
    Build(String),
}

impl DeliveryError {
    /// Returns `true` if the error is transient and a later attempt may
    /// succeed without any change on our side.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors() {
        assert!(DeliveryError::Timeout(Duration::from_secs(5)).is_transient());
        assert!(DeliveryError::Connection("reset".into()).is_transient());
    }

    #[test]
    fn permanent_errors() {
        assert!(!DeliveryError::Rejected("550 mailbox unavailable".into()).is_transient());
        assert!(!DeliveryError::Configuration("x".into()).is_transient());
        assert!(!DeliveryError::Build("x".into()).is_transient());
    }

    #[test]
    fn error_display() {
        let err = DeliveryError::Timeout(Duration::from_millis(500));
        assert_eq!(err.to_string(), "timeout after 500ms");

        let err = DeliveryError::Rejected("bad recipient".into());
        assert_eq!(err.to_string(), "rejected: bad recipient");
    }
}

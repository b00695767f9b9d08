use std::time::Duration;

use thiserror::Error;
use vigil_delivery::DeliveryError;

/// Errors specific to email delivery.
///
/// These are internal errors that get converted into [`DeliveryError`] at the
/// public API boundary.
#[derive(Debug, Error)]
pub enum EmailError {
    /// A sender or recipient address could not be parsed.
    #[error("invalid {field} address: {source}")]
    InvalidAddress {
        field: &'static str,
        source: lettre::address::AddressError,
    },

    /// The MIME message could not be assembled.
    #[error("failed to build email: {0}")]
    Build(String),

    /// The SMTP transport could not be configured.
    #[error("SMTP setup error: {0}")]
    Setup(String),

    /// The relay did not answer in time.
    #[error("SMTP timeout after {0:?}")]
    Timeout(Duration),

    /// A temporary SMTP or network failure.
    #[error("transient SMTP error: {0}")]
    Transient(String),

    /// The relay permanently refused the message.
    #[error("permanent SMTP error: {0}")]
    Permanent(String),
}

impl From<EmailError> for DeliveryError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::InvalidAddress { .. } | EmailError::Setup(_) => {
                DeliveryError::Configuration(err.to_string())
            }
            EmailError::Build(msg) => DeliveryError::Build(msg),
            EmailError::Timeout(after) => DeliveryError::Timeout(after),
            EmailError::Transient(msg) => DeliveryError::Connection(msg),
            EmailError::Permanent(msg) => DeliveryError::Rejected(msg),
        }
    }
}

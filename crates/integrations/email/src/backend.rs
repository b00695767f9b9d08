use async_trait::async_trait;
use vigil_core::Attachment;

use crate::error::EmailError;

/// A fully addressed email ready for transport.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Sender email address.
    pub from: String,
    /// Recipient email address.
    pub to: String,
    /// Email subject line.
    pub subject: String,
    /// Plain-text body.
    pub text: String,
    /// HTML body.
    pub html: String,
    /// Optional file attached after the bodies.
    pub attachment: Option<Attachment>,
}

/// Trait for pluggable email transports.
///
/// Implementations handle the actual transport of messages while
/// [`EmailDelivery`](crate::EmailDelivery) maps rendered documents to
/// [`EmailMessage`]s.
#[async_trait]
pub trait EmailBackend: Send + Sync + std::fmt::Debug {
    /// Send a message. Returns only once the relay has accepted it.
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;

    /// Return the backend name (e.g. `"smtp"`).
    fn backend_name(&self) -> &'static str;
}

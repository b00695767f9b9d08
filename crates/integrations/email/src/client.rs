use async_trait::async_trait;
use tracing::{debug, info, instrument};
use vigil_core::{Attachment, Document};
use vigil_delivery::{DeliveryClient, DeliveryError};

use crate::backend::{EmailBackend, EmailMessage};
use crate::config::EmailConfig;
use crate::smtp::SmtpBackend;

/// Delivers rendered reports as email through a pluggable backend.
///
/// # Examples
///
/// ```no_run
/// use vigil_delivery::DeliveryClient;
/// use vigil_email::{EmailConfig, EmailDelivery};
///
/// let config = EmailConfig::new("smtp.example.com", "vigil@example.com", "owner@example.com")
///     .with_credentials("user", "pass");
/// let client = EmailDelivery::new(&config).unwrap();
/// assert_eq!(client.name(), "email");
/// ```
pub struct EmailDelivery {
    from_address: String,
    to_address: String,
    backend: Box<dyn EmailBackend>,
}

impl std::fmt::Debug for EmailDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailDelivery")
            .field("from_address", &self.from_address)
            .field("to_address", &self.to_address)
            .field("backend", &self.backend)
            .finish()
    }
}

impl EmailDelivery {
    /// Create an `EmailDelivery` backed by SMTP.
    ///
    /// Returns [`DeliveryError::Configuration`] if the SMTP transport cannot
    /// be built.
    pub fn new(config: &EmailConfig) -> Result<Self, DeliveryError> {
        let backend = SmtpBackend::new(config.clone())?;
        Ok(Self::with_backend(
            config.from_address.clone(),
            config.to_address.clone(),
            Box::new(backend),
        ))
    }

    /// Create an `EmailDelivery` with a pre-built backend (for testing).
    pub fn with_backend(
        from_address: impl Into<String>,
        to_address: impl Into<String>,
        backend: Box<dyn EmailBackend>,
    ) -> Self {
        Self {
            from_address: from_address.into(),
            to_address: to_address.into(),
            backend,
        }
    }
}

#[async_trait]
impl DeliveryClient for EmailDelivery {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "email"
    }

    #[instrument(skip_all, fields(client = "email", subject = %document.subject))]
    async fn deliver(
        &self,
        document: &Document,
        attachment: Option<&Attachment>,
    ) -> Result<(), DeliveryError> {
        let message = EmailMessage {
            from: self.from_address.clone(),
            to: self.to_address.clone(),
            subject: document.subject.clone(),
            text: document.text.clone(),
            html: document.html.clone(),
            attachment: attachment.cloned(),
        };

        debug!(
            to = %message.to,
            backend = self.backend.backend_name(),
            has_attachment = message.attachment.is_some(),
            "sending report email"
        );

        self.backend.send(&message).await?;

        info!(to = %self.to_address, backend = self.backend.backend_name(), "report email sent");
        Ok(())
    }
}

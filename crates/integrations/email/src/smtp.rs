use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MimeAttachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, error, info};

use crate::backend::{EmailBackend, EmailMessage};
use crate::config::EmailConfig;
use crate::error::EmailError;

/// SMTP email delivery backend using `lettre`.
pub struct SmtpBackend {
    config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl std::fmt::Debug for SmtpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpBackend")
            .field("config", &self.config)
            .field("transport", &"<AsyncSmtpTransport>")
            .finish()
    }
}

impl SmtpBackend {
    /// Create a new `SmtpBackend` from the given configuration.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let transport = build_transport(&config)?;
        Ok(Self { config, transport })
    }

    /// Create a `SmtpBackend` with a pre-built transport (for testing).
    pub fn with_transport(config: EmailConfig, transport: AsyncSmtpTransport<Tokio1Executor>) -> Self {
        Self { config, transport }
    }
}

#[async_trait]
impl EmailBackend for SmtpBackend {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        debug!(to = %message.to, subject = %message.subject, "building SMTP message");
        let lettre_message = build_message(message)?;

        info!(
            to = %message.to,
            host = %self.config.smtp_host,
            port = self.config.smtp_port,
            "sending email via SMTP"
        );
        let timeout = self.config.timeout();
        tokio::time::timeout(timeout, self.transport.send(lettre_message))
            .await
            .map_err(|_| {
                error!(?timeout, "SMTP send timed out");
                EmailError::Timeout(timeout)
            })?
            .map_err(|e| {
                error!(error = %e, "SMTP send failed");
                map_smtp_error(&e)
            })?;

        info!(to = %message.to, "email sent successfully via SMTP");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "smtp"
    }
}

fn parse_mailbox(address: &str, field: &'static str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|source| EmailError::InvalidAddress { field, source })
}

/// Build a `lettre::Message`: a text/HTML alternative, wrapped in a mixed
/// multipart when an attachment is present.
fn build_message(msg: &EmailMessage) -> Result<Message, EmailError> {
    let builder = Message::builder()
        .from(parse_mailbox(&msg.from, "from")?)
        .to(parse_mailbox(&msg.to, "recipient")?)
        .subject(&msg.subject);

    let bodies = MultiPart::alternative_plain_html(msg.text.clone(), msg.html.clone());

    let result = match &msg.attachment {
        Some(attachment) => {
            let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                EmailError::Build(format!(
                    "invalid attachment content type `{}`: {e}",
                    attachment.content_type
                ))
            })?;
            let part = MimeAttachment::new(attachment.filename.clone())
                .body(attachment.bytes.clone(), content_type);
            builder.multipart(MultiPart::mixed().multipart(bodies).singlepart(part))
        }
        None => builder.multipart(bodies),
    };

    result.map_err(|e| EmailError::Build(e.to_string()))
}

/// Build an async SMTP transport from the given configuration.
fn build_transport(config: &EmailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
    let builder = if config.tls {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| EmailError::Setup(format!("SMTP TLS relay error: {e}")))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
    };

    let builder = builder
        .port(config.smtp_port)
        .timeout(Some(config.timeout()));

    let builder = if let Some((user, pass)) = config.credentials() {
        builder.credentials(Credentials::new(user.to_owned(), pass.to_owned()))
    } else {
        builder
    };

    Ok(builder.build())
}

/// Map a lettre SMTP error to the appropriate [`EmailError`] variant.
fn map_smtp_error(error: &lettre::transport::smtp::Error) -> EmailError {
    let message = error.to_string();

    if error.is_permanent() {
        EmailError::Permanent(message)
    } else {
        EmailError::Transient(message)
    }
}

use async_trait::async_trait;
use tracing::info;
use vigil_core::{Attachment, Document};

use crate::client::DeliveryClient;
use crate::error::DeliveryError;

/// A client that logs the document and reports success without performing
/// any external I/O.
///
/// Backs `--dry-run`. Success here confirms nothing, so dry runs also keep
/// the orchestrator away from the store.
pub struct LogDelivery {
    name: String,
}

impl LogDelivery {
    /// Create a new `LogDelivery` with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LogDelivery {
    fn default() -> Self {
        Self::new("log")
    }
}

#[async_trait]
impl DeliveryClient for LogDelivery {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(
        &self,
        document: &Document,
        attachment: Option<&Attachment>,
    ) -> Result<(), DeliveryError> {
        info!(
            client = %self.name,
            subject = %document.subject,
            html_bytes = document.html.len(),
            attachment = attachment.map(|a| a.filename.as_str()),
            "log delivery accepted document"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_delivery_name() {
        assert_eq!(LogDelivery::new("dry-run").name(), "dry-run");
        assert_eq!(LogDelivery::default().name(), "log");
    }

    #[tokio::test]
    async fn log_delivery_always_succeeds() {
        let client = LogDelivery::default();
        let document = Document {
            subject: "s".into(),
            html: String::new(),
            text: String::new(),
        };
        let attachment = Attachment::new("capture.jpg", "image/jpeg", vec![0; 16]);
        client.deliver(&document, Some(&attachment)).await.unwrap();
        client.deliver(&document, None).await.unwrap();
    }
}

use async_trait::async_trait;
use vigil_core::{Attachment, Document};

use crate::error::DeliveryError;

/// Sends a rendered report to its recipient.
///
/// `Ok(())` means the remote side confirmed acceptance. Any error leaves the
/// report undelivered; the caller decides whether to persist it or stop
/// draining.
#[async_trait]
pub trait DeliveryClient: Send + Sync {
    /// Returns the name of this client, used in logs.
    fn name(&self) -> &str;

    /// Deliver one document with its optional attachment.
    async fn deliver(
        &self,
        document: &Document,
        attachment: Option<&Attachment>,
    ) -> Result<(), DeliveryError>;
}

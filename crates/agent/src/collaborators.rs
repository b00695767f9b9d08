use async_trait::async_trait;
use vigil_core::{Attachment, Location, SystemSnapshot};
use vigil_locate::LocationResolver;

/// Captures a binary asset (e.g. a camera frame) to attach to a report.
///
/// Capture is best-effort: implementations log their own failures and
/// return `None`.
#[async_trait]
pub trait Capture: Send + Sync {
    async fn capture(&self) -> Option<Attachment>;
}

/// A capture source that never produces anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

#[async_trait]
impl Capture for NoCapture {
    async fn capture(&self) -> Option<Attachment> {
        None
    }
}

/// Collects a process and network summary of the machine.
///
/// Never fails: unavailable data is reported as zero or empty.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn snapshot(&self) -> SystemSnapshot;
}

/// Determines where the machine is.
///
/// Never fails: [`Location::Unknown`] stands for "no source answered".
#[async_trait]
pub trait Locator: Send + Sync {
    async fn locate(&self) -> Location;
}

#[async_trait]
impl Locator for LocationResolver {
    async fn locate(&self) -> Location {
        self.resolve().await
    }
}

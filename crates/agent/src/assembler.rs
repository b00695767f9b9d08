use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use vigil_core::{Attachment, HostIdentity, Report};

use crate::collaborators::{Capture, Inventory, Locator};

/// A freshly assembled report together with its attachment content.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledReport {
    pub report: Report,
    pub attachment: Option<Attachment>,
}

/// Gathers capture, location and inventory data into a [`Report`].
///
/// None of the collaborators can fail the assembly; whatever they could not
/// provide shows up as an absent attachment, [`vigil_core::Location::Unknown`]
/// or an empty snapshot.
pub struct SnapshotAssembler {
    capture: Arc<dyn Capture>,
    locator: Arc<dyn Locator>,
    inventory: Arc<dyn Inventory>,
    host: HostIdentity,
}

impl SnapshotAssembler {
    pub fn new(
        capture: Arc<dyn Capture>,
        locator: Arc<dyn Locator>,
        inventory: Arc<dyn Inventory>,
        host: HostIdentity,
    ) -> Self {
        Self {
            capture,
            locator,
            inventory,
            host,
        }
    }

    pub async fn assemble(&self) -> AssembledReport {
        let attachment = self.capture.capture().await;
        debug!(captured = attachment.is_some(), "capture finished");

        let location = self.locator.locate().await;
        debug!(method = location.method(), "location resolved");

        let system_snapshot = self.inventory.snapshot().await;

        let report = Report::new(
            Utc::now(),
            self.host.clone(),
            location,
            system_snapshot,
            attachment.as_ref().map(Attachment::to_ref),
        );
        info!(
            report_id = %report.id,
            location = report.location.method(),
            processes = report.system_snapshot.processes.len(),
            connections = report.system_snapshot.connections.len(),
            "report assembled"
        );

        AssembledReport { report, attachment }
    }
}

impl std::fmt::Debug for SnapshotAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotAssembler")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use vigil_core::{Location, SystemSnapshot};

    use super::*;
    use crate::collaborators::NoCapture;

    struct Fixed(Location);

    #[async_trait]
    impl Locator for Fixed {
        async fn locate(&self) -> Location {
            self.0.clone()
        }
    }

    struct Busy;

    #[async_trait]
    impl Inventory for Busy {
        async fn snapshot(&self) -> SystemSnapshot {
            SystemSnapshot {
                cpu_percent: 99.0,
                memory_percent: 50.0,
                processes: vec!["make".into()],
                connections: Vec::new(),
            }
        }
    }

    struct Camera;

    #[async_trait]
    impl Capture for Camera {
        async fn capture(&self) -> Option<Attachment> {
            Some(Attachment::new("capture.jpg", "image/jpeg", vec![1, 2, 3]))
        }
    }

    fn host() -> HostIdentity {
        HostIdentity {
            hostname: "desk-01".into(),
            username: "alice".into(),
        }
    }

    #[tokio::test]
    async fn assembles_all_collaborator_outputs() {
        let assembler = SnapshotAssembler::new(
            Arc::new(Camera),
            Arc::new(Fixed(Location::Coordinates {
                lat: 1.0,
                lng: 2.0,
                accuracy_m: 3.0,
            })),
            Arc::new(Busy),
            host(),
        );

        let assembled = assembler.assemble().await;

        assert_eq!(assembled.report.host, host());
        assert_eq!(assembled.report.location.method(), "native sensor");
        assert_eq!(assembled.report.system_snapshot.processes, ["make"]);
        assert_eq!(
            assembled.report.attachment.as_ref().map(|a| a.filename.as_str()),
            Some("capture.jpg")
        );
        assert_eq!(assembled.attachment.unwrap().bytes, [1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_capture_and_location_still_assemble() {
        let assembler = SnapshotAssembler::new(
            Arc::new(NoCapture),
            Arc::new(Fixed(Location::Unknown)),
            Arc::new(Busy),
            host(),
        );

        let assembled = assembler.assemble().await;

        assert!(assembled.attachment.is_none());
        assert!(assembled.report.attachment.is_none());
        assert!(assembled.report.location.is_unknown());
    }

    #[tokio::test]
    async fn each_assembly_gets_a_fresh_id() {
        let assembler = SnapshotAssembler::new(
            Arc::new(NoCapture),
            Arc::new(Fixed(Location::Unknown)),
            Arc::new(Busy),
            host(),
        );
        let first = assembler.assemble().await;
        let second = assembler.assemble().await;
        assert_ne!(first.report.id, second.report.id);
    }
}

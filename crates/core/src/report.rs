use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attachment::AttachmentRef;
use crate::id::ReportId;
use crate::location::Location;
use crate::snapshot::{HostIdentity, SystemSnapshot};

/// One immutable snapshot of situational data.
///
/// A report is fully assembled before any delivery decision is made and is
/// never mutated afterwards: it is either delivered immediately or persisted
/// as-is and read back later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Time-derived unique identifier.
    pub id: ReportId,
    /// When the report was assembled.
    pub created_at: DateTime<Utc>,
    /// Machine and user the report describes.
    pub host: HostIdentity,
    /// Result of location resolution.
    pub location: Location,
    /// Process and network summary.
    pub system_snapshot: SystemSnapshot,
    /// Binary asset captured alongside the report, if any.
    #[serde(default)]
    pub attachment: Option<AttachmentRef>,
}

impl Report {
    /// Assemble a report stamped with `created_at`.
    pub fn new(
        created_at: DateTime<Utc>,
        host: HostIdentity,
        location: Location,
        system_snapshot: SystemSnapshot,
        attachment: Option<AttachmentRef>,
    ) -> Self {
        Self {
            id: ReportId::generate(created_at),
            created_at,
            host,
            location,
            system_snapshot,
            attachment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ConnectionInfo;

    fn sample() -> Report {
        Report::new(
            Utc::now(),
            HostIdentity {
                hostname: "desk-01".into(),
                username: "alice".into(),
            },
            Location::IpLocale {
                ip: "198.51.100.4".into(),
                place: "Lisbon, Portugal".into(),
                isp: "Example Telecom".into(),
            },
            SystemSnapshot {
                cpu_percent: 3.5,
                memory_percent: 61.0,
                processes: vec!["init".into(), "sshd".into()],
                connections: vec![ConnectionInfo {
                    process: "sshd".into(),
                    remote_addr: "192.0.2.10:51234".into(),
                }],
            },
            Some(AttachmentRef {
                filename: "capture.jpg".into(),
                content_type: "image/jpeg".into(),
            }),
        )
    }

    #[test]
    fn json_roundtrip_preserves_every_field() {
        let report = sample();
        let json = serde_json::to_string(&report).unwrap();
        let back: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn missing_attachment_field_defaults_to_none() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json.as_object_mut().unwrap().remove("attachment");
        let back: Report = serde_json::from_value(json).unwrap();
        assert!(back.attachment.is_none());
    }

    #[test]
    fn consecutive_reports_get_distinct_ids() {
        let a = sample();
        let b = sample();
        assert_ne!(a.id, b.id);
    }
}

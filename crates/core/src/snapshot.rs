use serde::{Deserialize, Serialize};

/// An established network connection and the process that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Name of the owning process.
    pub process: String,
    /// Remote endpoint as `ip:port`.
    pub remote_addr: String,
}

/// Best-effort summary of what the machine was doing.
///
/// Missing data is represented as zero or empty, never as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    /// Global CPU usage in percent.
    pub cpu_percent: f32,
    /// Used memory as a percentage of total memory.
    pub memory_percent: f32,
    /// Names of running processes, capped by the collector.
    #[serde(default)]
    pub processes: Vec<String>,
    /// Established connections with their owning process.
    #[serde(default)]
    pub connections: Vec<ConnectionInfo>,
}

/// Who the report is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIdentity {
    /// Machine host name.
    pub hostname: String,
    /// Logged-in user name.
    pub username: String,
}

impl Default for HostIdentity {
    fn default() -> Self {
        Self {
            hostname: "unknown".to_owned(),
            username: "unknown".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_tolerates_missing_lists() {
        let json = serde_json::json!({ "cpu_percent": 12.5, "memory_percent": 40.0 });
        let snapshot: SystemSnapshot = serde_json::from_value(json).unwrap();
        assert!(snapshot.processes.is_empty());
        assert!(snapshot.connections.is_empty());
    }

    #[test]
    fn default_identity_is_unknown() {
        let id = HostIdentity::default();
        assert_eq!(id.hostname, "unknown");
        assert_eq!(id.username, "unknown");
    }
}

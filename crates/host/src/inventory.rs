use std::collections::BTreeMap;

use async_trait::async_trait;
use sysinfo::{MINIMUM_CPU_UPDATE_INTERVAL, ProcessesToUpdate, System};
use tracing::{debug, warn};
use vigil_agent::Inventory;
use vigil_core::SystemSnapshot;

use crate::connections;

/// Samples the machine through `sysinfo`, plus procfs for connections.
#[derive(Debug, Clone, Copy)]
pub struct SysInventory {
    process_limit: usize,
    connection_limit: usize,
}

impl SysInventory {
    /// `process_limit` and `connection_limit` cap the number of process
    /// names and connections in a snapshot.
    pub fn new(process_limit: usize, connection_limit: usize) -> Self {
        Self {
            process_limit,
            connection_limit,
        }
    }
}

#[async_trait]
impl Inventory for SysInventory {
    async fn snapshot(&self) -> SystemSnapshot {
        let mut system = System::new();
        // CPU usage is a delta between two refreshes.
        system.refresh_cpu_usage();
        tokio::time::sleep(MINIMUM_CPU_UPDATE_INTERVAL).await;

        let limits = *self;
        match tokio::task::spawn_blocking(move || collect(system, limits)).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, "inventory collection failed");
                SystemSnapshot::default()
            }
        }
    }
}

fn collect(mut system: System, limits: SysInventory) -> SystemSnapshot {
    system.refresh_cpu_usage();
    system.refresh_memory();
    system.refresh_processes(ProcessesToUpdate::All, true);

    let names: BTreeMap<u32, String> = system
        .processes()
        .iter()
        .map(|(pid, process)| (pid.as_u32(), process.name().to_string_lossy().into_owned()))
        .collect();
    let mut connections = connections::established(&names);
    if connections.len() > limits.connection_limit {
        debug!(
            found = connections.len(),
            limit = limits.connection_limit,
            "truncating connection list"
        );
        connections.truncate(limits.connection_limit);
    }

    let snapshot = SystemSnapshot {
        cpu_percent: percent_or_zero(system.global_cpu_usage()),
        memory_percent: percent_or_zero(ratio(system.used_memory(), system.total_memory())),
        processes: names.into_values().take(limits.process_limit).collect(),
        connections,
    };
    debug!(
        cpu = snapshot.cpu_percent,
        memory = snapshot.memory_percent,
        processes = snapshot.processes.len(),
        connections = snapshot.connections.len(),
        "inventory sampled"
    );
    snapshot
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn ratio(used: u64, total: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (used as f64 / total as f64 * 100.0) as f32
}

/// Clamp a percentage into `0..=100`; non-finite readings become zero so
/// they serialize as numbers.
fn percent_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

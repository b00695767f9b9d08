use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Answers "can we reach the outside world right now?".
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_reachable(&self) -> bool;
}

/// Connectivity settings (the `[connectivity]` config section).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// `host:port` to open a TCP connection to.
    pub target: String,
    /// Connection deadline in milliseconds.
    pub timeout_ms: u64,
    /// Probe again before delivering the fresh report instead of reusing
    /// the result from the start of the run.
    pub recheck: bool,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            target: "8.8.8.8:53".to_owned(),
            timeout_ms: 3_000,
            recheck: false,
        }
    }
}

/// Probes connectivity by opening (and immediately dropping) a TCP
/// connection.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    target: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(target: impl Into<String>, timeout: Duration) -> Self {
        Self {
            target: target.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ConnectivityConfig) -> Self {
        Self::new(config.target.clone(), Duration::from_millis(config.timeout_ms))
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn is_reachable(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.target)).await {
            Ok(Ok(_)) => {
                debug!(probe_target = %self.target, "connectivity probe succeeded");
                true
            }
            Ok(Err(error)) => {
                warn!(probe_target = %self.target, %error, "connectivity probe failed");
                false
            }
            Err(_) => {
                warn!(probe_target = %self.target, timeout = ?self.timeout, "connectivity probe timed out");
                false
            }
        }
    }
}

/// A probe with a fixed answer, used to force offline mode.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe {
    reachable: bool,
}

impl FixedProbe {
    pub fn offline() -> Self {
        Self { reachable: false }
    }

    pub fn online() -> Self {
        Self { reachable: true }
    }
}

#[async_trait]
impl ConnectivityProbe for FixedProbe {
    async fn is_reachable(&self) -> bool {
        self.reachable
    }
}

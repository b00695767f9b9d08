use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};
use vigil_agent::Capture;
use vigil_core::Attachment;

use crate::error::CaptureError;

const DEVICE_PLACEHOLDER: &str = "{device}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Capture settings (the `[capture]` config section).
///
/// `command` is a program followed by its arguments. `{device}` is replaced
/// by the device index and `{output}` by the path the frame must be written
/// to. An empty command disables capture.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub command: Vec<String>,
    /// Device indices to try, in order.
    pub devices: Vec<u32>,
    /// Deadline per device, in milliseconds.
    pub timeout_ms: u64,
    /// Extension of the output file (also used for the attachment name).
    pub extension: String,
    pub content_type: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            command: [
                "ffmpeg",
                "-hide_banner",
                "-loglevel",
                "error",
                "-y",
                "-f",
                "v4l2",
                "-i",
                "/dev/video{device}",
                "-frames:v",
                "1",
                "{output}",
            ]
            .map(str::to_owned)
            .to_vec(),
            devices: vec![0],
            timeout_ms: 5_000,
            extension: "jpg".to_owned(),
            content_type: "image/jpeg".to_owned(),
        }
    }
}

impl CaptureConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Grabs a frame by running an external program.
///
/// Output goes to a private temporary directory that is removed when the
/// capture finishes, whatever the outcome.
#[derive(Debug, Clone)]
pub struct CommandCapture {
    config: CaptureConfig,
}

impl CommandCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        !self.config.command.is_empty() && !self.config.devices.is_empty()
    }

    fn attachment_name(&self) -> String {
        format!("capture.{}", self.config.extension)
    }

    async fn capture_device(&self, dir: &Path, device: u32) -> Result<Vec<u8>, CaptureError> {
        let output = dir.join(format!("device-{device}.{}", self.config.extension));
        let output_str = output.to_string_lossy();
        let device_str = device.to_string();

        let mut args = self.config.command.iter().map(|part| {
            part.replace(DEVICE_PLACEHOLDER, &device_str)
                .replace(OUTPUT_PLACEHOLDER, &output_str)
        });
        let Some(program) = args.next() else {
            return Err(CaptureError::Empty);
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let timeout = self.config.timeout();
        let result = tokio::time::timeout(timeout, command.output())
            .await
            .map_err(|_| CaptureError::Timeout(timeout))?
            .map_err(CaptureError::Spawn)?;

        if !result.status.success() {
            return Err(CaptureError::Failed {
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_owned(),
            });
        }

        let bytes = match tokio::fs::read(&output).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(CaptureError::Empty);
            }
            Err(err) => return Err(err.into()),
        };
        if bytes.is_empty() {
            return Err(CaptureError::Empty);
        }
        Ok(bytes)
    }
}

#[async_trait]
impl Capture for CommandCapture {
    async fn capture(&self) -> Option<Attachment> {
        if !self.is_enabled() {
            debug!("capture disabled");
            return None;
        }

        let dir = match tempfile::Builder::new().prefix("vigil-capture-").tempdir() {
            Ok(dir) => dir,
            Err(error) => {
                warn!(%error, "failed to create capture directory");
                return None;
            }
        };

        for &device in &self.config.devices {
            match self.capture_device(dir.path(), device).await {
                Ok(bytes) => {
                    info!(device, bytes = bytes.len(), "frame captured");
                    return Some(Attachment::new(
                        self.attachment_name(),
                        self.config.content_type.clone(),
                        bytes,
                    ));
                }
                Err(error) => warn!(device, %error, "capture failed"),
            }
        }
        None
    }
}

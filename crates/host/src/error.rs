use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Why a single capture attempt produced nothing.
///
/// Capture failures never reach the report; they are logged and the next
/// device is tried.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The capture program could not be started.
    #[error("failed to start capture command: {0}")]
    Spawn(#[source] std::io::Error),

    /// The capture program did not finish in time and was killed.
    #[error("capture command timed out after {0:?}")]
    Timeout(Duration),

    /// The capture program exited unsuccessfully.
    #[error("capture command exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    /// The output file could not be prepared or read back.
    #[error("capture i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The program succeeded but wrote no data.
    #[error("capture produced no output")]
    Empty,
}

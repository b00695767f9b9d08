//! Collaborators backed by the local machine.
//!
//! - [`CommandCapture`] runs an external program (by default `ffmpeg`) to grab
//!   a camera frame.
//! - [`SysInventory`] samples CPU, memory, processes and established TCP
//!   connections.
//! - [`current_identity`] reads the hostname and the logged-in user.

pub mod capture;
mod connections;
pub mod error;
pub mod identity;
pub mod inventory;

pub use capture::{CaptureConfig, CommandCapture};
pub use error::CaptureError;
pub use identity::current_identity;
pub use inventory::SysInventory;

//! Delivery clients for rendered reports.
//!
//! [`DeliveryClient`] is the seam between the agent and the outside world.
//! Concrete transports live in their own crates (e.g. `vigil-email`);
//! [`LogDelivery`] is the in-process client used for dry runs.

pub mod client;
pub mod error;
pub mod log;

pub use client::DeliveryClient;
pub use error::DeliveryError;
pub use log::LogDelivery;

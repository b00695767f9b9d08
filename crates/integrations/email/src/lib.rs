//! Email delivery for Vigil reports.
//!
//! [`EmailDelivery`] implements [`vigil_delivery::DeliveryClient`] on top of
//! an [`EmailBackend`]; [`SmtpBackend`] is the lettre-based transport.

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod smtp;

pub use backend::{EmailBackend, EmailMessage};
pub use client::EmailDelivery;
pub use config::EmailConfig;
pub use error::EmailError;
pub use smtp::SmtpBackend;

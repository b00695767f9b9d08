//! Ordered fallback resolution.
//!
//! A [`FallbackResolver`] holds an ordered list of [`Candidate`] sources and
//! returns the first one that succeeds. Failures are logged and collected,
//! never propagated; an exhausted resolution is mapped to a caller-chosen
//! "unknown" value with [`Resolution::into_value_or`].

pub mod candidate;
pub mod error;
pub mod resolver;

pub use candidate::Candidate;
pub use error::CandidateError;
pub use resolver::{CandidateFailure, FallbackResolver, Resolution};

//! Durable storage for reports that could not be delivered yet.
//!
//! [`FileReportStore`] keeps one JSON record per report in a directory,
//! with the report's attachment as a sibling file. Listing order is
//! creation order, so draining the backlog oldest-first is a plain
//! iteration over [`ReportStore::list_pending`].

pub mod error;
pub mod file;
pub mod store;

pub use error::StoreError;
pub use file::FileReportStore;
pub use store::{ReportStore, StoredReportEntry, SweepReport};

use std::path::PathBuf;

use vigil_core::{Attachment, Report};

use crate::error::StoreError;

/// A persisted report as returned by [`ReportStore::list_pending`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReportEntry {
    /// The report as it was appended.
    pub report: Report,
    /// Location of the record file.
    pub record_path: PathBuf,
    /// Location of the attachment file, when the report declares one. The
    /// file itself may have gone missing.
    pub attachment_path: Option<PathBuf>,
}

/// Outcome of a [`ReportStore::sweep`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Leftover temporary files from interrupted writes.
    pub temp_files_removed: usize,
    /// Attachments whose record no longer exists.
    pub orphans_removed: usize,
    /// Unparseable records moved aside.
    pub quarantined: usize,
}

impl SweepReport {
    /// Whether the sweep found nothing to do.
    pub fn is_clean(&self) -> bool {
        self.temp_files_removed == 0 && self.orphans_removed == 0 && self.quarantined == 0
    }
}

/// Durable queue of reports awaiting delivery.
///
/// The store is the only record of pending work: every query reads the
/// backing medium afresh. Implementations must make `append` all-or-nothing
/// and must never overwrite an existing entry.
pub trait ReportStore: Send + Sync {
    /// Persist a report and its attachment content.
    fn append(
        &self,
        report: &Report,
        attachment: Option<&Attachment>,
    ) -> Result<StoredReportEntry, StoreError>;

    /// All pending entries, oldest first. Unreadable entries are skipped.
    fn list_pending(&self) -> Result<Vec<StoredReportEntry>, StoreError>;

    /// Load an entry's attachment content, if it still exists.
    fn load_attachment(&self, entry: &StoredReportEntry) -> Result<Option<Attachment>, StoreError>;

    /// Delete an entry. Removing an already removed entry is not an error.
    fn remove(&self, entry: &StoredReportEntry) -> Result<(), StoreError>;

    /// Set aside an entry that can never be delivered, so it stops blocking
    /// the queue. Kept for inspection rather than deleted.
    fn quarantine(&self, entry: &StoredReportEntry) -> Result<(), StoreError>;

    /// Clean up debris left by interrupted writes and corrupt records.
    fn sweep(&self) -> Result<SweepReport, StoreError>;
}

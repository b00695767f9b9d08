use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info, warn};
use vigil_core::{Attachment, Report, ReportId};

use crate::error::StoreError;
use crate::store::{ReportStore, StoredReportEntry, SweepReport};

const RECORD_EXTENSION: &str = "json";
const TEMP_PREFIX: &str = ".vigil-";
const QUARANTINE_DIR: &str = "quarantine";

/// A [`ReportStore`] backed by one directory.
///
/// Each report becomes `<id>.json`, and its attachment (if any) a sibling
/// `<id>.<ext>`. Files are written to a hidden temp file in the same
/// directory, synced, then published with a no-clobber rename, so readers
/// only ever see complete files. The record is published last and is the
/// commit point of an append.
#[derive(Debug, Clone)]
pub struct FileReportStore {
    dir: PathBuf,
}

impl FileReportStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        if !dir.is_dir() {
            return Err(StoreError::NotADirectory(dir));
        }
        debug!(dir = %dir.display(), "opened report store");
        Ok(Self { dir })
    }

    /// The directory this store lives in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: &ReportId) -> PathBuf {
        self.dir.join(format!("{id}.{RECORD_EXTENSION}"))
    }

    fn attachment_path(&self, report: &Report) -> Option<PathBuf> {
        report
            .attachment
            .as_ref()
            .map(|attachment| match attachment.extension() {
                RECORD_EXTENSION => "bin",
                other => other,
            })
            .map(|extension| self.dir.join(format!("{}.{extension}", report.id)))
    }

    /// Write `bytes` to `target` through a synced temp file. Never replaces
    /// an existing file.
    fn publish(&self, target: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let mut tmp: NamedTempFile = Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;

        match tmp.persist_noclobber(target) {
            Ok(_) => {}
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StoreError::Conflict(target.to_path_buf()));
            }
            Err(err) => return Err(err.error.into()),
        }

        if let Ok(dir) = fs::File::open(&self.dir) {
            let _ = dir.sync_all();
        }
        Ok(())
    }

    fn read_record(&self, path: &Path) -> Result<StoredReportEntry, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = fs::read(path)?;
        let report: Report = serde_json::from_slice(&bytes).map_err(|e| corrupt(e.to_string()))?;

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if report.id.as_str() != stem {
            return Err(corrupt(format!("record id `{}` does not match file name", report.id)));
        }

        Ok(StoredReportEntry {
            attachment_path: self.attachment_path(&report),
            record_path: path.to_path_buf(),
            report,
        })
    }

    /// Visible file names in the store directory, sorted.
    fn file_names(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Move `path` into the quarantine directory. Returns whether it existed.
    fn quarantine_file(&self, path: &Path) -> Result<bool, StoreError> {
        let Some(name) = path.file_name() else {
            return Ok(false);
        };
        let dir = self.dir.join(QUARANTINE_DIR);
        fs::create_dir_all(&dir)?;
        match fs::rename(path, dir.join(name)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Split `<id>.<ext>` into id and extension.
fn split_name(name: &str) -> Option<(&str, &str)> {
    name.rsplit_once('.')
}

/// Whether `stem` has the shape of a generated report id
/// (`YYYYMMDDTHHMMSS.ffffffZ-NNNN`).
fn is_report_stem(stem: &str) -> bool {
    stem.len() == 28 && stem.as_bytes()[8] == b'T' && ReportId::parse(stem).is_some()
}

fn remove_if_present(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

impl ReportStore for FileReportStore {
    fn append(
        &self,
        report: &Report,
        attachment: Option<&Attachment>,
    ) -> Result<StoredReportEntry, StoreError> {
        let id = ReportId::parse(report.id.as_str()).ok_or_else(|| StoreError::Corrupt {
            path: self.dir.clone(),
            reason: format!("unusable report id `{}`", report.id),
        })?;
        let record_path = self.record_path(&id);
        if record_path.exists() {
            return Err(StoreError::Conflict(record_path));
        }

        let attachment_path = self.attachment_path(report);
        let written_attachment = match (&attachment_path, attachment) {
            (Some(path), Some(attachment)) => {
                self.publish(path, &attachment.bytes)?;
                Some(path)
            }
            _ => None,
        };

        let record = serde_json::to_vec_pretty(report)?;
        if let Err(err) = self.publish(&record_path, &record) {
            if let Some(path) = written_attachment {
                if let Err(rollback) = remove_if_present(path) {
                    warn!(path = %path.display(), error = %rollback, "failed to roll back attachment");
                }
            }
            return Err(err);
        }

        info!(report_id = %report.id, "report persisted");
        Ok(StoredReportEntry {
            report: report.clone(),
            record_path,
            attachment_path,
        })
    }

    fn list_pending(&self) -> Result<Vec<StoredReportEntry>, StoreError> {
        let mut entries = Vec::new();
        for name in self.file_names()? {
            if name.starts_with('.') {
                continue;
            }
            if !matches!(split_name(&name), Some((_, RECORD_EXTENSION))) {
                continue;
            }
            match self.read_record(&self.dir.join(&name)) {
                Ok(entry) => entries.push(entry),
                Err(error) => warn!(file = %name, %error, "skipping unreadable record"),
            }
        }
        debug!(pending = entries.len(), "listed pending reports");
        Ok(entries)
    }

    fn load_attachment(&self, entry: &StoredReportEntry) -> Result<Option<Attachment>, StoreError> {
        let (Some(path), Some(reference)) = (&entry.attachment_path, &entry.report.attachment)
        else {
            return Ok(None);
        };
        match fs::read(path) {
            Ok(bytes) => Ok(Some(Attachment::from_ref(reference, bytes))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(report_id = %entry.report.id, "attachment file is missing");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn remove(&self, entry: &StoredReportEntry) -> Result<(), StoreError> {
        remove_if_present(&entry.record_path)?;
        if let Some(path) = &entry.attachment_path {
            remove_if_present(path)?;
        }
        debug!(report_id = %entry.report.id, "report removed from store");
        Ok(())
    }

    fn quarantine(&self, entry: &StoredReportEntry) -> Result<(), StoreError> {
        // Attachment first: a lone attachment would be swept as an orphan.
        if let Some(path) = &entry.attachment_path {
            self.quarantine_file(path)?;
        }
        self.quarantine_file(&entry.record_path)?;
        warn!(report_id = %entry.report.id, "report quarantined");
        Ok(())
    }

    fn sweep(&self) -> Result<SweepReport, StoreError> {
        let mut report = SweepReport::default();
        let names = self.file_names()?;

        let mut live = HashSet::new();
        let mut corrupt = HashSet::new();
        for name in &names {
            if let Some((stem, RECORD_EXTENSION)) = split_name(name) {
                if name.starts_with('.') {
                    continue;
                }
                match self.read_record(&self.dir.join(name)) {
                    Ok(_) => live.insert(stem.to_owned()),
                    Err(StoreError::Corrupt { .. }) => corrupt.insert(stem.to_owned()),
                    Err(err) => return Err(err),
                };
            }
        }

        for name in &names {
            if name.starts_with(TEMP_PREFIX) {
                if remove_if_present(&self.dir.join(name))? {
                    report.temp_files_removed += 1;
                }
                continue;
            }
            if name.starts_with('.') {
                continue;
            }
            let Some((stem, extension)) = split_name(name) else {
                continue;
            };
            if corrupt.contains(stem) {
                self.quarantine_file(&self.dir.join(name))?;
                if extension == RECORD_EXTENSION {
                    warn!(file = %name, "corrupt record quarantined");
                    report.quarantined += 1;
                }
            } else if !live.contains(stem) && is_report_stem(stem) {
                if remove_if_present(&self.dir.join(name))? {
                    debug!(file = %name, "removed orphaned attachment");
                    report.orphans_removed += 1;
                }
            }
        }

        if !report.is_clean() {
            info!(
                temp_files = report.temp_files_removed,
                orphans = report.orphans_removed,
                quarantined = report.quarantined,
                "store swept"
            );
        }
        Ok(report)
    }
}

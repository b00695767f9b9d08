use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wraps after this many ids; the timestamp prefix keeps ids distinct across wraps.
const SEQUENCE_SPAN: u32 = 10_000;

static SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Identifier of a [`Report`](crate::Report).
///
/// The textual form is `YYYYMMDDTHHMMSS.ffffffZ-NNNN`: a UTC timestamp with
/// microsecond resolution followed by a process-wide sequence number. Sorting
/// ids lexicographically yields creation order, which the report store relies
/// on to drain its backlog oldest-first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    /// Generate a fresh id for a report created at `now`.
    ///
    /// Two calls in the same process never return the same id, even when the
    /// clock has not advanced between them.
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed) % SEQUENCE_SPAN;
        Self(format!("{}-{seq:04}", now.format("%Y%m%dT%H%M%S%.6fZ")))
    }

    /// Parse an id read back from storage (e.g. a record file stem).
    ///
    /// Returns `None` if the value is empty or contains characters that could
    /// not have been produced by [`ReportId::generate`].
    pub fn parse(value: &str) -> Option<Self> {
        let valid = !value.is_empty()
            && !value.starts_with('.')
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        valid.then(|| Self(value.to_owned()))
    }

    /// Return the inner string as a str slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReportId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn generated_ids_are_unique_within_one_instant() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let a = ReportId::generate(now);
        let b = ReportId::generate(now);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("20260301T120000.000000Z-"));
    }

    #[test]
    fn lexicographic_order_follows_time() {
        let earlier = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let later = earlier + chrono::Duration::microseconds(1);
        let a = ReportId::generate(earlier);
        let b = ReportId::generate(later);
        assert!(a < b);
        assert!(a.as_str() < b.as_str());
    }

    #[test]
    fn parse_accepts_generated_ids() {
        let id = ReportId::generate(Utc::now());
        assert_eq!(ReportId::parse(id.as_str()), Some(id));
    }

    #[test]
    fn parse_rejects_path_like_values() {
        assert!(ReportId::parse("").is_none());
        assert!(ReportId::parse("../etc/passwd").is_none());
        assert!(ReportId::parse(".hidden").is_none());
        assert!(ReportId::parse("a b").is_none());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ReportId::parse("20260301T120000.000000Z-0007").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"20260301T120000.000000Z-0007\"");
    }
}

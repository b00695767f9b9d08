use tracing::{debug, info, warn};

use crate::candidate::Candidate;
use crate::error::CandidateError;

/// A candidate that was tried and did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    /// Name of the failed candidate.
    pub name: String,
    /// Why it failed.
    pub error: CandidateError,
}

/// Outcome of a [`FallbackResolver::resolve`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// A candidate produced a value. Later candidates were not invoked.
    Resolved {
        /// Name of the winning candidate.
        source: String,
        /// The value it produced.
        value: T,
        /// Earlier candidates that failed, in invocation order.
        failures: Vec<CandidateFailure>,
    },
    /// Every candidate failed (or there were none).
    Exhausted {
        /// All failures, in invocation order.
        failures: Vec<CandidateFailure>,
    },
}

impl<T> Resolution<T> {
    /// The resolved value, or `unknown` when resolution was exhausted.
    pub fn into_value_or(self, unknown: T) -> T {
        match self {
            Self::Resolved { value, .. } => value,
            Self::Exhausted { .. } => unknown,
        }
    }

    /// Name of the winning candidate, if any.
    pub fn source(&self) -> Option<&str> {
        match self {
            Self::Resolved { source, .. } => Some(source.as_str()),
            Self::Exhausted { .. } => None,
        }
    }

    /// Failures recorded before resolution finished.
    pub fn failures(&self) -> &[CandidateFailure] {
        match self {
            Self::Resolved { failures, .. } | Self::Exhausted { failures } => failures,
        }
    }

    /// Whether no candidate succeeded.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

/// Tries candidate sources in priority order and returns the first success.
///
/// Candidates run strictly one after another: earlier in the list means
/// higher trust, and the list order is the only tie-break. Each candidate's
/// failure (error, empty result, or its own timeout) is logged and swallowed;
/// the resolver itself never fails. Given the same candidates and the same
/// probe outcomes, it always selects the same result.
pub struct FallbackResolver<T> {
    candidates: Vec<Candidate<T>>,
}

impl<T> FallbackResolver<T> {
    /// Create a resolver over an ordered list of candidates.
    pub fn new(candidates: Vec<Candidate<T>>) -> Self {
        Self { candidates }
    }

    /// Append a candidate with the lowest priority so far.
    pub fn push(&mut self, candidate: Candidate<T>) {
        self.candidates.push(candidate);
    }

    /// Number of configured candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether no candidates are configured.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidate names in priority order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(Candidate::name)
    }

    /// Run the candidates in order until one succeeds.
    pub async fn resolve(&self) -> Resolution<T> {
        let mut failures = Vec::new();

        for candidate in &self.candidates {
            debug!(candidate = candidate.name(), timeout = ?candidate.timeout(), "trying candidate");
            match candidate.run().await {
                Ok(value) => {
                    info!(
                        candidate = candidate.name(),
                        skipped_failures = failures.len(),
                        "candidate resolved"
                    );
                    return Resolution::Resolved {
                        source: candidate.name().to_owned(),
                        value,
                        failures,
                    };
                }
                Err(error) => {
                    warn!(candidate = candidate.name(), %error, "candidate failed, falling through");
                    failures.push(CandidateFailure {
                        name: candidate.name().to_owned(),
                        error,
                    });
                }
            }
        }

        warn!(attempted = failures.len(), "all candidates failed");
        Resolution::Exhausted { failures }
    }
}

impl<T> Default for FallbackResolver<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> std::fmt::Debug for FallbackResolver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackResolver")
            .field("candidates", &self.candidates)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(100);

    fn counted(
        name: &str,
        calls: &Arc<AtomicU32>,
        outcome: Result<&'static str, CandidateError>,
    ) -> Candidate<&'static str> {
        let calls = Arc::clone(calls);
        Candidate::new(name, TIMEOUT, move || {
            calls.fetch_add(1, Ordering::SeqCst);
            let outcome = outcome.clone();
            async move { outcome }
        })
    }

    #[tokio::test]
    async fn first_success_wins_and_later_candidates_are_not_invoked() {
        let a = Arc::new(AtomicU32::new(0));
        let b = Arc::new(AtomicU32::new(0));
        let c = Arc::new(AtomicU32::new(0));
        let resolver = FallbackResolver::new(vec![
            counted("a", &a, Err(CandidateError::failed("boom"))),
            counted("b", &b, Ok("from-b")),
            counted("c", &c, Ok("from-c")),
        ]);

        let resolution = resolver.resolve().await;

        assert_eq!(resolution.source(), Some("b"));
        assert_eq!(resolution.failures().len(), 1);
        assert_eq!(resolution.failures()[0].name, "a");
        assert_eq!(resolution.into_value_or("unknown"), "from-b");
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
        assert_eq!(c.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exhaustion_yields_the_sentinel() {
        let calls = Arc::new(AtomicU32::new(0));
        let resolver = FallbackResolver::new(vec![
            counted("a", &calls, Err(CandidateError::failed("dns"))),
            counted("b", &calls, Err(CandidateError::Empty)),
        ]);

        let resolution = resolver.resolve().await;

        assert!(resolution.is_exhausted());
        assert_eq!(resolution.failures().len(), 2);
        assert_eq!(resolution.into_value_or("unknown"), "unknown");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_resolver_is_exhausted() {
        let resolver: FallbackResolver<u8> = FallbackResolver::default();
        assert!(resolver.is_empty());
        assert_eq!(resolver.resolve().await.into_value_or(0), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_candidate_times_out_and_falls_through() {
        let resolver = FallbackResolver::new(vec![
            Candidate::new("sensor", TIMEOUT, || async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, CandidateError>("late")
            }),
            Candidate::new("lookup", TIMEOUT, || async { Ok("fast") }),
        ]);

        let resolution = resolver.resolve().await;

        assert_eq!(resolution.source(), Some("lookup"));
        assert_eq!(
            resolution.failures()[0].error,
            CandidateError::Timeout(TIMEOUT)
        );
    }

    #[tokio::test]
    async fn resolution_is_deterministic() {
        let calls = Arc::new(AtomicU32::new(0));
        let resolver = FallbackResolver::new(vec![
            counted("a", &calls, Err(CandidateError::Empty)),
            counted("b", &calls, Ok("b")),
            counted("c", &calls, Ok("c")),
        ]);

        let first = resolver.resolve().await;
        let second = resolver.resolve().await;

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn names_follow_priority_order() {
        let mut resolver = FallbackResolver::new(vec![Candidate::new("one", TIMEOUT, || async {
            Ok::<_, CandidateError>(1)
        })]);
        resolver.push(Candidate::new("two", TIMEOUT, || async { Ok(2) }));
        assert_eq!(resolver.len(), 2);
        assert_eq!(resolver.names().collect::<Vec<_>>(), ["one", "two"]);
    }
}

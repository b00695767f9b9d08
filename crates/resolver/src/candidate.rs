use std::future::Future;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::CandidateError;

type Probe<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, CandidateError>> + Send + Sync>;

/// One alternative source in a [`FallbackResolver`](crate::FallbackResolver).
///
/// A candidate is a named nullary async operation bounded by its own
/// timeout. The probe is invoked afresh on every resolution; nothing is
/// cached between calls.
pub struct Candidate<T> {
    name: String,
    timeout: Duration,
    probe: Probe<T>,
}

impl<T> Candidate<T> {
    /// Create a candidate from an async closure.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use vigil_resolver::{Candidate, CandidateError};
    ///
    /// let candidate = Candidate::new("static", Duration::from_secs(1), || async {
    ///     Ok::<_, CandidateError>(42)
    /// });
    /// assert_eq!(candidate.name(), "static");
    /// ```
    pub fn new<F, Fut>(name: impl Into<String>, timeout: Duration, probe: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CandidateError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            timeout,
            probe: Box::new(move || probe().boxed()),
        }
    }

    /// The candidate's name, used in logs and resolution results.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Upper bound on a single probe invocation.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the probe once, mapping an elapsed deadline to
    /// [`CandidateError::Timeout`].
    pub(crate) async fn run(&self) -> Result<T, CandidateError> {
        match tokio::time::timeout(self.timeout, (self.probe)()).await {
            Ok(result) => result,
            Err(_) => Err(CandidateError::Timeout(self.timeout)),
        }
    }
}

impl<T> std::fmt::Debug for Candidate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

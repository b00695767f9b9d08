use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};
use vigil_core::{Attachment, Report, ReportId};
use vigil_delivery::{DeliveryClient, DeliveryError};
use vigil_store::{ReportStore, StoreError, StoredReportEntry, SweepReport};

use crate::assembler::SnapshotAssembler;
use crate::connectivity::ConnectivityProbe;
use crate::error::{AgentError, RenderError};
use crate::render::Renderer;

/// Behavioural switches for an [`Orchestrator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OrchestratorConfig {
    /// Probe connectivity again before delivering the fresh report instead
    /// of reusing the answer from the start of the run.
    pub recheck_connectivity: bool,
    /// Render and hand reports to the delivery client without touching the
    /// store: nothing is removed, persisted, quarantined or swept.
    pub dry_run: bool,
}

/// Attempts at persisting a report whose id turns out to be taken.
const PERSIST_ATTEMPTS: usize = 3;

/// What happened during one [`Orchestrator::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Whether the first connectivity probe succeeded.
    pub reachable: bool,
    /// Backlog entries delivered and removed.
    pub drained: usize,
    /// Whether draining stopped on a delivery failure.
    pub drain_failed: bool,
    /// Backlog entries left behind when draining stopped.
    pub drain_remaining: usize,
    /// Delivered entries that could not be removed (they will be sent again).
    pub remove_failures: usize,
    /// Backlog entries that could not be rendered and were set aside.
    pub quarantined: usize,
    /// Whether the fresh report was delivered immediately.
    pub delivered_now: bool,
    /// Whether an immediate delivery of the fresh report was attempted and failed.
    pub deliver_failed: bool,
    /// Whether the fresh report was persisted for later.
    pub persisted: bool,
    /// Whether the fresh report could be neither delivered nor persisted.
    pub lost: bool,
    /// Result of the end-of-run store sweep, if it succeeded.
    pub cleanup: Option<SweepReport>,
}

impl RunSummary {
    /// Whether the run left delivery work unresolved. Maps to a non-zero
    /// exit status.
    pub fn has_unresolved_failures(&self) -> bool {
        self.drain_failed || self.deliver_failed || self.lost || self.quarantined > 0
    }
}

/// Why a single delivery attempt failed.
#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl AttemptError {
    /// Whether retrying the same report later may succeed.
    fn is_transient(&self) -> bool {
        match self {
            Self::Render(_) => false,
            Self::Delivery(error) => error.is_transient(),
        }
    }
}

fn log_attempt_failure(report_id: &ReportId, error: &AttemptError, outcome: &str) {
    if error.is_transient() {
        warn!(%report_id, %error, transient = true, "delivery failed, {outcome}");
    } else {
        error!(%report_id, %error, transient = false, "delivery rejected, {outcome}");
    }
}

/// Runs one deliver-or-queue pass: drain the backlog, assemble a fresh
/// report, deliver it or persist it, then sweep the store.
///
/// The store is the only memory between runs; nothing is cached here.
pub struct Orchestrator {
    store: Arc<dyn ReportStore>,
    probe: Arc<dyn ConnectivityProbe>,
    assembler: SnapshotAssembler,
    renderer: Arc<dyn Renderer>,
    delivery: Arc<dyn DeliveryClient>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create a new builder for constructing an `Orchestrator`.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    #[instrument(skip(self), fields(client = self.delivery.name()))]
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary {
            reachable: self.probe.is_reachable().await,
            ..RunSummary::default()
        };

        if summary.reachable {
            self.drain(&mut summary).await;
        } else {
            info!("offline, skipping backlog drain");
        }

        let mut assembled = self.assembler.assemble().await;

        let reachable = if self.config.recheck_connectivity {
            self.probe.is_reachable().await
        } else {
            summary.reachable
        };

        if reachable {
            match self
                .attempt(&assembled.report, assembled.attachment.as_ref())
                .await
            {
                Ok(()) => {
                    info!(report_id = %assembled.report.id, "report delivered");
                    summary.delivered_now = true;
                }
                Err(error) => {
                    log_attempt_failure(&assembled.report.id, &error, "persisting report");
                    summary.deliver_failed = true;
                }
            }
        }

        if self.config.dry_run {
            if !summary.delivered_now {
                info!(report_id = %assembled.report.id, "dry run, report not persisted");
            }
        } else {
            if !summary.delivered_now {
                match self.persist(&mut assembled.report, assembled.attachment.as_ref()) {
                    Ok(()) => summary.persisted = true,
                    Err(error) => {
                        error!(report_id = %assembled.report.id, %error, "failed to persist report, report lost");
                        summary.lost = true;
                    }
                }
            }

            match self.store.sweep() {
                Ok(sweep) => summary.cleanup = Some(sweep),
                Err(error) => warn!(%error, "store sweep failed"),
            }
        }

        info!(
            reachable = summary.reachable,
            drained = summary.drained,
            drain_failed = summary.drain_failed,
            delivered_now = summary.delivered_now,
            quarantined = summary.quarantined,
            persisted = summary.persisted,
            lost = summary.lost,
            dry_run = self.config.dry_run,
            "run complete"
        );
        summary
    }

    /// Deliver pending reports oldest first, stopping at the first delivery
    /// failure. Entries that cannot be rendered are quarantined and skipped.
    async fn drain(&self, summary: &mut RunSummary) {
        let pending = match self.store.list_pending() {
            Ok(pending) => pending,
            Err(error) => {
                warn!(%error, "failed to list pending reports, treating backlog as empty");
                return;
            }
        };
        if pending.is_empty() {
            debug!("backlog empty");
            return;
        }
        info!(pending = pending.len(), "draining backlog");

        for (index, entry) in pending.iter().enumerate() {
            match self.attempt_stored(entry).await {
                Ok(()) => {}
                Err(error @ AttemptError::Render(_)) => {
                    log_attempt_failure(&entry.report.id, &error, "setting stored report aside");
                    self.set_aside(entry, summary);
                    continue;
                }
                Err(error) => {
                    log_attempt_failure(&entry.report.id, &error, "stopping drain");
                    summary.drain_failed = true;
                    summary.drain_remaining = pending.len() - index;
                    return;
                }
            }

            summary.drained += 1;
            if self.config.dry_run {
                continue;
            }
            if let Err(error) = self.store.remove(entry) {
                error!(report_id = %entry.report.id, %error, "delivered report could not be removed");
                summary.remove_failures += 1;
            }
        }
    }

    fn set_aside(&self, entry: &StoredReportEntry, summary: &mut RunSummary) {
        if self.config.dry_run {
            return;
        }
        match self.store.quarantine(entry) {
            Ok(()) => summary.quarantined += 1,
            Err(error) => {
                error!(report_id = %entry.report.id, %error, "failed to quarantine report");
            }
        }
    }

    /// Append the report, taking a fresh id if another writer already
    /// claimed this one.
    fn persist(
        &self,
        report: &mut Report,
        attachment: Option<&Attachment>,
    ) -> Result<(), StoreError> {
        let mut attempt = 1;
        loop {
            match self.store.append(report, attachment) {
                Err(StoreError::Conflict(path)) if attempt < PERSIST_ATTEMPTS => {
                    warn!(report_id = %report.id, path = %path.display(), "report id already taken, regenerating");
                    report.id = ReportId::generate(Utc::now());
                    attempt += 1;
                }
                other => return other.map(|_| ()),
            }
        }
    }

    async fn attempt_stored(&self, entry: &StoredReportEntry) -> Result<(), AttemptError> {
        let attachment = self.store.load_attachment(entry).unwrap_or_else(|error| {
            warn!(report_id = %entry.report.id, %error, "failed to load attachment, sending without it");
            None
        });
        self.attempt(&entry.report, attachment.as_ref()).await
    }

    async fn attempt(
        &self,
        report: &Report,
        attachment: Option<&Attachment>,
    ) -> Result<(), AttemptError> {
        let document = self.renderer.render(report)?;
        self.delivery.deliver(&document, attachment).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("assembler", &self.assembler)
            .field("delivery", &self.delivery.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Fluent builder for constructing an [`Orchestrator`].
///
/// Every collaborator is required; only the config has a default.
#[derive(Default)]
pub struct OrchestratorBuilder {
    store: Option<Arc<dyn ReportStore>>,
    probe: Option<Arc<dyn ConnectivityProbe>>,
    assembler: Option<SnapshotAssembler>,
    renderer: Option<Arc<dyn Renderer>>,
    delivery: Option<Arc<dyn DeliveryClient>>,
    config: OrchestratorConfig,
}

impl OrchestratorBuilder {
    /// Create a new builder with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backlog store.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn ReportStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the connectivity probe.
    #[must_use]
    pub fn probe(mut self, probe: Arc<dyn ConnectivityProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Set the report assembler.
    #[must_use]
    pub fn assembler(mut self, assembler: SnapshotAssembler) -> Self {
        self.assembler = Some(assembler);
        self
    }

    /// Set the renderer.
    #[must_use]
    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Set the delivery client.
    #[must_use]
    pub fn delivery(mut self, delivery: Arc<dyn DeliveryClient>) -> Self {
        self.delivery = Some(delivery);
        self
    }

    /// Set the orchestrator configuration.
    #[must_use]
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Consume the builder and produce an [`Orchestrator`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Configuration`] if a collaborator is missing.
    pub fn build(self) -> Result<Orchestrator, AgentError> {
        let missing = |what: &str| AgentError::Configuration(format!("{what} is required"));
        Ok(Orchestrator {
            store: self.store.ok_or_else(|| missing("report store"))?,
            probe: self.probe.ok_or_else(|| missing("connectivity probe"))?,
            assembler: self.assembler.ok_or_else(|| missing("snapshot assembler"))?,
            renderer: self.renderer.ok_or_else(|| missing("renderer"))?,
            delivery: self.delivery.ok_or_else(|| missing("delivery client"))?,
            config: self.config,
        })
    }
}

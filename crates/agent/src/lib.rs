//! The Vigil agent: assemble a report, then deliver it or queue it.
//!
//! One [`Orchestrator::run`] is one pass. It drains the persisted backlog
//! while online, assembles a fresh [`vigil_core::Report`], delivers it or
//! persists it, and sweeps the store. Collaborators sit behind traits
//! ([`Capture`], [`Locator`], [`Inventory`], [`ConnectivityProbe`],
//! [`Renderer`], [`vigil_delivery::DeliveryClient`],
//! [`vigil_store::ReportStore`]) so the flow can be exercised without
//! hardware or network access.

pub mod assembler;
pub mod collaborators;
pub mod connectivity;
pub mod error;
pub mod orchestrator;
pub mod render;

pub use assembler::{AssembledReport, SnapshotAssembler};
pub use collaborators::{Capture, Inventory, Locator, NoCapture};
pub use connectivity::{ConnectivityConfig, ConnectivityProbe, FixedProbe, TcpProbe};
pub use error::{AgentError, RenderError};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, OrchestratorConfig, RunSummary};
pub use render::{HtmlRenderer, Renderer, ReportConfig};

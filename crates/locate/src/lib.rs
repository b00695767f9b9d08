//! Location sources for Vigil reports.
//!
//! Two tiers, tried in order by a [`FallbackResolver`]: a native positioning
//! sensor (gpsd) and a list of external IP lookup services. The first source
//! that answers decides the [`Location`]; when none does, the result is
//! [`Location::Unknown`]. Resolution never fails.

pub mod config;
pub mod error;
pub mod gpsd;
pub mod ip_lookup;

use std::sync::Arc;

use reqwest::Client;
use tracing::info;
use vigil_core::Location;
use vigil_resolver::{Candidate, CandidateError, FallbackResolver};

pub use config::{LocationConfig, LookupFormat, LookupService};
pub use error::LookupError;
pub use gpsd::GpsdSensor;
pub use ip_lookup::IpLookup;

/// Resolves the machine's location through ordered fallback sources.
#[derive(Debug, Default)]
pub struct LocationResolver {
    sources: FallbackResolver<Location>,
}

impl LocationResolver {
    /// Wrap an already assembled candidate list.
    pub fn new(sources: FallbackResolver<Location>) -> Self {
        Self { sources }
    }

    /// Build the sensor tier (when configured) followed by each lookup
    /// service, in configuration order.
    pub fn from_config(config: &LocationConfig) -> Result<Self, LookupError> {
        let mut sources = FallbackResolver::default();

        if let Some(addr) = &config.gpsd {
            let sensor = Arc::new(GpsdSensor::new(addr.clone()));
            sources.push(Candidate::new("gpsd", config.sensor_timeout(), move || {
                let sensor = Arc::clone(&sensor);
                async move { sensor.locate().await.map_err(CandidateError::from) }
            }));
        }

        let client = Client::builder().timeout(config.lookup_timeout()).build()?;
        for service in &config.services {
            let name = service.name.clone();
            let lookup = Arc::new(IpLookup::with_client(service.clone(), client.clone()));
            sources.push(Candidate::new(name, config.lookup_timeout(), move || {
                let lookup = Arc::clone(&lookup);
                async move { lookup.lookup().await.map_err(CandidateError::from) }
            }));
        }

        info!(sources = ?sources.names().collect::<Vec<_>>(), "location sources configured");
        Ok(Self::new(sources))
    }

    /// Resolve the current location, or [`Location::Unknown`].
    pub async fn resolve(&self) -> Location {
        self.sources.resolve().await.into_value_or(Location::Unknown)
    }
}

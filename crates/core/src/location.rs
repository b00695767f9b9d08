use serde::{Deserialize, Serialize};

/// Where the machine was when a report was assembled.
///
/// Produced by the location resolver: the first tier that succeeds decides
/// the variant, and [`Location::Unknown`] is the sentinel when every tier
/// failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    /// A fix from a local positioning sensor.
    Coordinates {
        /// Latitude in decimal degrees.
        lat: f64,
        /// Longitude in decimal degrees.
        lng: f64,
        /// Estimated horizontal error in meters.
        accuracy_m: f64,
    },
    /// A coarse position derived from the public IP address.
    IpLocale {
        /// Public IP address as reported by the lookup service.
        ip: String,
        /// Human-readable place, e.g. `"Oslo, Norway"`.
        place: String,
        /// Internet service provider or organisation owning the address.
        isp: String,
    },
    /// No source produced a usable answer.
    #[default]
    Unknown,
}

impl Location {
    /// Short label describing how the location was obtained.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Coordinates { .. } => "native sensor",
            Self::IpLocale { .. } => "ip lookup",
            Self::Unknown => "unavailable",
        }
    }

    /// Whether this is the [`Location::Unknown`] sentinel.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// A map link for coordinate fixes.
    pub fn maps_link(&self) -> Option<String> {
        match self {
            Self::Coordinates { lat, lng, .. } => Some(format!(
                "https://www.openstreetmap.org/?mlat={lat:.6}&mlon={lng:.6}#map=17/{lat:.6}/{lng:.6}"
            )),
            _ => None,
        }
    }
}

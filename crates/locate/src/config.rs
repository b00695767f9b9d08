use std::time::Duration;

use serde::Deserialize;

/// How to map a lookup service's JSON response onto an IP locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFormat {
    /// `https://ipapi.co/json/`: `ip`, `city`, `country_name`, `org`.
    IpapiCo,
    /// `http://ip-api.com/json`: `query`, `city`, `country`, `isp`, `status`.
    IpApiCom,
}

/// One external IP geolocation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LookupService {
    /// Name used in logs.
    pub name: String,
    /// Endpoint returning JSON for the caller's public address.
    pub url: String,
    /// Response field mapping.
    pub format: LookupFormat,
}

/// Location resolution settings (the `[location]` config section).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Address of a gpsd daemon (e.g. `"127.0.0.1:2947"`). When unset, the
    /// native sensor tier is skipped.
    pub gpsd: Option<String>,
    /// Deadline for the native sensor, in milliseconds.
    pub sensor_timeout_ms: u64,
    /// Deadline for each lookup service, in milliseconds.
    pub lookup_timeout_ms: u64,
    /// Lookup services, tried in order after the sensor.
    pub services: Vec<LookupService>,
}

impl LocationConfig {
    /// Sensor deadline as a [`Duration`].
    pub fn sensor_timeout(&self) -> Duration {
        Duration::from_millis(self.sensor_timeout_ms)
    }

    /// Per-service deadline as a [`Duration`].
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            gpsd: None,
            sensor_timeout_ms: 5_000,
            lookup_timeout_ms: 1_000,
            services: default_services(),
        }
    }
}

fn default_services() -> Vec<LookupService> {
    vec![
        LookupService {
            name: "ipapi.co".to_owned(),
            url: "https://ipapi.co/json/".to_owned(),
            format: LookupFormat::IpapiCo,
        },
        LookupService {
            name: "ip-api.com".to_owned(),
            url: "http://ip-api.com/json".to_owned(),
            format: LookupFormat::IpApiCom,
        },
    ]
}

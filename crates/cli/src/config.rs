use std::path::{Path, PathBuf};

use serde::Deserialize;
use vigil_agent::{ConnectivityConfig, ReportConfig};
use vigil_email::EmailConfig;
use vigil_host::CaptureConfig;
use vigil_locate::LocationConfig;

/// Top-level configuration for the agent, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct VigilConfig {
    /// SMTP delivery settings.
    #[serde(default)]
    pub email: EmailConfig,
    /// Subject line and snapshot presentation.
    #[serde(default)]
    pub report: ReportConfig,
    /// Reachability probe.
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    /// Location sources, tried in order.
    #[serde(default)]
    pub location: LocationConfig,
    /// Offline report store.
    #[serde(default)]
    pub store: StoreConfig,
    /// Camera capture.
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where undelivered reports are kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub directory: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("offline_reports"),
        }
    }
}

/// Log output. Logs go to stderr unless `file` is set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append log lines to this file instead.
    pub file: Option<PathBuf>,
}

/// Errors raised while loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

impl VigilConfig {
    /// Load configuration from `path`, or use defaults if the file does not
    /// exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check that real delivery has what it needs.
    pub fn validate_email(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("email.smtp_host", &self.email.smtp_host),
            ("email.from_address", &self.email.from_address),
            ("email.to_address", &self.email.to_address),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{field} is required (or run with --dry-run)"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use vigil_locate::LookupFormat;

    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: VigilConfig = toml::from_str("").unwrap();

        assert_eq!(config.email.smtp_port, 587);
        assert!(config.email.tls);
        assert_eq!(config.report.process_limit, 15);
        assert_eq!(config.report.connection_limit, 100);
        assert_eq!(config.connectivity.target, "8.8.8.8:53");
        assert!(!config.connectivity.recheck);
        assert!(config.location.gpsd.is_none());
        assert_eq!(config.location.services.len(), 2);
        assert_eq!(config.store.directory, PathBuf::from("offline_reports"));
        assert_eq!(config.capture.devices, [0]);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn full_file_is_parsed() {
        let toml = r#"
            [email]
            from_address = "vigil@example.com"
            to_address = "owner@example.com"
            smtp_host = "smtp.example.com"
            smtp_port = 2525
            password = "hunter2"
            tls = false

            [report]
            subject = "Laptop check-in"
            process_limit = 5
            connection_limit = 20

            [connectivity]
            target = "1.1.1.1:53"
            timeout_ms = 500
            recheck = true

            [location]
            gpsd = "127.0.0.1:2947"
            sensor_timeout_ms = 2000

            [[location.services]]
            name = "ip-api.com"
            url = "http://ip-api.com/json"
            format = "ip_api_com"

            [store]
            directory = "/var/lib/vigil/reports"

            [capture]
            command = []

            [logging]
            file = "vigil.log"
        "#;

        let config: VigilConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.email.smtp_port, 2525);
        assert!(!config.email.tls);
        assert_eq!(config.email.password.as_deref(), Some("hunter2"));
        assert_eq!(config.report.subject, "Laptop check-in");
        assert_eq!(config.report.process_limit, 5);
        assert_eq!(config.report.connection_limit, 20);
        assert_eq!(config.connectivity.timeout_ms, 500);
        assert!(config.connectivity.recheck);
        assert_eq!(config.location.gpsd.as_deref(), Some("127.0.0.1:2947"));
        assert_eq!(config.location.sensor_timeout_ms, 2000);
        assert_eq!(config.location.lookup_timeout_ms, 1000);
        assert_eq!(config.location.services.len(), 1);
        assert_eq!(config.location.services[0].format, LookupFormat::IpApiCom);
        assert_eq!(
            config.store.directory,
            PathBuf::from("/var/lib/vigil/reports")
        );
        assert!(config.capture.command.is_empty());
        assert_eq!(config.logging.file, Some(PathBuf::from("vigil.log")));
        assert!(config.validate_email().is_ok());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = VigilConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.report.subject, "Vigil report");
    }

    #[test]
    fn malformed_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vigil.toml");
        std::fs::write(&path, "[email\nsmtp_host = 1").unwrap();

        let err = VigilConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("vigil.toml"));
    }

    #[test]
    fn unconfigured_email_is_invalid() {
        let err = VigilConfig::default().validate_email().unwrap_err();
        assert_eq!(
            err.to_string(),
            "email.smtp_host is required (or run with --dry-run)"
        );
    }

    #[test]
    fn email_without_recipient_is_invalid() {
        let config: VigilConfig = toml::from_str(
            r#"
            [email]
            smtp_host = "smtp.example.com"
            from_address = "vigil@example.com"
        "#,
        )
        .unwrap();

        let err = config.validate_email().unwrap_err();
        assert_eq!(
            err.to_string(),
            "email.to_address is required (or run with --dry-run)"
        );
    }
}

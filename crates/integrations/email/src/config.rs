use std::time::Duration;

use serde::Deserialize;

/// Email delivery configuration (the `[email]` config section).
///
/// # Examples
///
/// ```
/// use vigil_email::EmailConfig;
///
/// let config = EmailConfig::new("smtp.example.com", "vigil@example.com", "owner@example.com");
/// assert_eq!(config.smtp_port, 587);
/// assert!(config.tls);
/// ```
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// The `From` address used in outgoing emails.
    pub from_address: String,

    /// Where reports are sent.
    pub to_address: String,

    /// SMTP server hostname. Empty until configured.
    pub smtp_host: String,

    /// SMTP server port. Defaults to 587 (STARTTLS submission port).
    pub smtp_port: u16,

    /// Optional SMTP username. When a password is set without a username,
    /// the sender address is used to log in.
    pub username: Option<String>,

    /// Optional SMTP password.
    pub password: Option<String>,

    /// Whether to upgrade the connection with STARTTLS. Defaults to `true`.
    pub tls: bool,

    /// Upper bound on each SMTP command, in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("from_address", &self.from_address)
            .field("to_address", &self.to_address)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("tls", &self.tls)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl EmailConfig {
    /// Create an `EmailConfig` for the given relay, sender and recipient.
    pub fn new(
        smtp_host: impl Into<String>,
        from_address: impl Into<String>,
        to_address: impl Into<String>,
    ) -> Self {
        Self {
            smtp_host: smtp_host.into(),
            from_address: from_address.into(),
            to_address: to_address.into(),
            ..Self::default()
        }
    }

    /// Set SMTP authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Override the default SMTP port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }

    /// Set whether STARTTLS should be used.
    #[must_use]
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// SMTP command timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Login name and password, if a password is configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let password = self.password.as_deref()?;
        let username = self.username.as_deref().unwrap_or(&self.from_address);
        Some((username, password))
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from_address: String::new(),
            to_address: String::new(),
            smtp_host: String::new(),
            smtp_port: 587,
            username: None,
            password: None,
            tls: true,
            timeout_secs: 30,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Which delivery backend a transport uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Deliver over SMTP.
    #[default]
    Smtp,
    /// Build and record messages without delivering them.
    Stub,
}

/// SMTP-specific configuration settings.
///
/// Holds all settings needed to establish a connection to an SMTP server.
#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    pub smtp_host: String,

    /// SMTP server port. Defaults to 587 (STARTTLS submission port).
    pub smtp_port: u16,

    /// Optional SMTP username for authentication.
    pub username: Option<String>,

    /// Optional SMTP password for authentication.
    pub password: Option<String>,

    /// Whether to use TLS for the SMTP connection. Defaults to `true`.
    pub tls: bool,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("tls", &self.tls)
            .finish()
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_owned(),
            smtp_port: 587,
            username: None,
            password: None,
            tls: true,
        }
    }
}

/// Transport configuration, handed to the selected backend.
///
/// # Examples
///
/// ```
/// use mailwright_email::{BackendKind, TransportConfig};
///
/// let config = TransportConfig::smtp("smtp.example.com");
/// assert_eq!(config.backend, BackendKind::Smtp);
/// assert_eq!(config.smtp_port, 587);
/// assert!(config.tls);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Backend selection: `"smtp"` (default) or `"stub"`.
    #[serde(default)]
    pub backend: BackendKind,

    /// SMTP server hostname.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP server port. Defaults to 587.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Optional SMTP username for authentication.
    #[serde(default)]
    pub username: Option<String>,

    /// Optional SMTP password for authentication.
    #[serde(default)]
    pub password: Option<String>,

    /// Whether to use TLS for SMTP. Defaults to `true`.
    #[serde(default = "default_tls")]
    pub tls: bool,
}

fn default_smtp_host() -> String {
    "localhost".to_owned()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_tls() -> bool {
    true
}

impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("backend", &self.backend)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("tls", &self.tls)
            .finish()
    }
}

impl TransportConfig {
    /// Create an SMTP transport configuration for `smtp_host`.
    pub fn smtp(smtp_host: impl Into<String>) -> Self {
        Self {
            smtp_host: smtp_host.into(),
            ..Self::default()
        }
    }

    /// Create a stub transport configuration.
    pub fn stub() -> Self {
        Self {
            backend: BackendKind::Stub,
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

    /// Set whether TLS should be used for SMTP.
    #[must_use]
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Extract the SMTP-specific config.
    pub fn smtp_config(&self) -> SmtpConfig {
        SmtpConfig {
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
            username: self.username.clone(),
            password: self.password.clone(),
            tls: self.tls,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Smtp,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            tls: default_tls(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = TransportConfig::default();
        assert_eq!(config.backend, BackendKind::Smtp);
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 587);
        assert!(config.tls);
        assert!(config.username.is_none());
        assert!(config.password.is_none());
    }

    #[test]
    fn stub_constructor() {
        let config = TransportConfig::stub();
        assert_eq!(config.backend, BackendKind::Stub);
    }

    #[test]
    fn with_credentials_sets_auth() {
        let config = TransportConfig::smtp("smtp.example.com").with_credentials("user", "pass");
        assert_eq!(config.username.as_deref(), Some("user"));
        assert_eq!(config.password.as_deref(), Some("pass"));
    }

    #[test]
    fn smtp_config_extraction() {
        let config = TransportConfig::smtp("smtp.example.com")
            .with_credentials("user", "pass")
            .with_port(465)
            .with_tls(false);

        let smtp = config.smtp_config();
        assert_eq!(smtp.smtp_host, "smtp.example.com");
        assert_eq!(smtp.smtp_port, 465);
        assert_eq!(smtp.username.as_deref(), Some("user"));
        assert!(!smtp.tls);
    }

    #[test]
    fn deserialize_partial_json_uses_defaults() {
        let json = serde_json::json!({ "backend": "stub" });
        let config: TransportConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.backend, BackendKind::Stub);
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 587);
        assert!(config.tls);
    }

    #[test]
    fn debug_redacts_password() {
        let config = TransportConfig::smtp("smtp.example.com")
            .with_credentials("user", "test-pw-placeholder");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"), "password must be redacted");
        assert!(
            !debug.contains("test-pw-placeholder"),
            "password must not appear in debug output"
        );
        assert!(
            debug.contains("smtp.example.com"),
            "non-secret fields should be visible"
        );

        let smtp_debug = format!("{:?}", config.smtp_config());
        assert!(!smtp_debug.contains("test-pw-placeholder"));
    }
}

use std::path::Path;

use mailwright_core::ConfigError;
use mailwright_email::{BackendKind, TransportConfig};
use mailwright_views::ViewsConfig;
use serde::{Deserialize, Serialize};

/// Top-level mailer configuration, loaded from a TOML file.
///
/// ```toml
/// default_from = "noreply@example.com"
/// inline_styles = true
///
/// [transport]
/// backend = "smtp"
/// smtp_host = "smtp.example.com"
///
/// [views.engines.html.j2]
/// path = "templates/html"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Sender used when a message does not set `from`.
    #[serde(default = "default_from")]
    pub default_from: String,

    /// Delivery backend settings.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Template engine registrations.
    #[serde(default)]
    pub views: ViewsConfig,

    /// Convert `data:` URI images into inline MIME parts before delivery.
    #[serde(default = "default_true")]
    pub inline_images: bool,

    /// Inline stylesheet rules into rendered HTML.
    #[serde(default = "default_true")]
    pub inline_styles: bool,

    /// Read `<link rel="stylesheet">` sheets while inlining styles.
    #[serde(default = "default_true")]
    pub load_linked_stylesheets: bool,
}

fn default_from() -> String {
    "noreply@localhost".to_owned()
}

fn default_true() -> bool {
    true
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            default_from: default_from(),
            transport: TransportConfig::default(),
            views: ViewsConfig::default(),
            inline_images: true,
            inline_styles: true,
            load_linked_stylesheets: true,
        }
    }
}

impl MailerConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read a configuration file.
    ///
    /// Relative template directories are taken relative to the directory
    /// containing the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?;
        let mut config = Self::from_toml_str(&contents)?;
        if let Some(base) = path.parent() {
            config.rebase_template_dirs(base);
        }
        Ok(config)
    }

    /// Check everything that can be checked without touching the network.
    ///
    /// Verifies engine keys and template directories, and that an SMTP
    /// transport has a host and port.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_from.trim().is_empty() {
            return Err(ConfigError::Parse("default_from must not be empty".to_owned()));
        }

        for (format, extension, engine) in self.views.entries()? {
            if !engine.path.is_dir() {
                return Err(ConfigError::MissingTemplateDir {
                    format: format.to_string(),
                    extension,
                    path: engine.path.clone(),
                });
            }
        }

        if self.transport.backend == BackendKind::Smtp {
            if self.transport.smtp_host.trim().is_empty() {
                return Err(ConfigError::Transport("smtp_host must not be empty".to_owned()));
            }
            if self.transport.smtp_port == 0 {
                return Err(ConfigError::Transport("smtp_port must not be 0".to_owned()));
            }
            if self.transport.username.is_some() != self.transport.password.is_some() {
                return Err(ConfigError::Transport(
                    "username and password must be set together".to_owned(),
                ));
            }
        }
        Ok(())
    }

    fn rebase_template_dirs(&mut self, base: &Path) {
        for engines in self.views.engines.values_mut() {
            for engine in engines.values_mut() {
                if engine.path.is_relative() {
                    engine.path = base.join(&engine.path);
                }
            }
        }
    }
}

use std::collections::HashMap;
use std::path::PathBuf;

use mailwright_core::{ConfigError, Format};
use serde::{Deserialize, Serialize};

/// Template engine registrations, keyed by format and then by file extension.
///
/// Empty by default, in which case every template reference is read from
/// disk unrendered.
///
/// ```toml
/// [views.engines.html.j2]
/// path = "templates/html"
///
/// [views.engines.text.j2]
/// path = "templates/text"
/// fuel = 50000
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewsConfig {
    #[serde(default)]
    pub engines: HashMap<String, HashMap<String, EngineConfig>>,
}

/// Which template language an engine speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    #[serde(alias = "jinja")]
    Minijinja,
}

/// Settings for one registered engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Template language. Defaults to `minijinja`.
    #[serde(default)]
    pub engine: EngineKind,

    /// Directory templates are loaded from.
    pub path: PathBuf,

    /// Evaluation fuel per render (denial-of-service protection).
    #[serde(default = "default_fuel")]
    pub fuel: u64,

    /// Maximum rendered output size in bytes.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
}

fn default_fuel() -> u64 {
    100_000
}

fn default_max_output_bytes() -> usize {
    1_024 * 1_024
}

impl EngineConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            engine: EngineKind::default(),
            path: path.into(),
            fuel: default_fuel(),
            max_output_bytes: default_max_output_bytes(),
        }
    }

    #[must_use]
    pub fn with_fuel(mut self, fuel: u64) -> Self {
        self.fuel = fuel;
        self
    }

    #[must_use]
    pub fn with_max_output_bytes(mut self, limit: usize) -> Self {
        self.max_output_bytes = limit;
        self
    }
}

impl ViewsConfig {
    /// Register an engine for `format` and `extension`.
    #[must_use]
    pub fn with_engine(
        mut self,
        format: Format,
        extension: impl Into<String>,
        engine: EngineConfig,
    ) -> Self {
        self.engines
            .entry(format.as_str().to_owned())
            .or_default()
            .insert(extension.into(), engine);
        self
    }

    /// Validated, normalized registrations.
    ///
    /// Format keys must name a known [`Format`]; extensions lose any leading
    /// dot and must not be empty. Entries are sorted so that registry
    /// construction is deterministic.
    pub fn entries(&self) -> Result<Vec<(Format, String, &EngineConfig)>, ConfigError> {
        let mut entries = Vec::new();
        for (format_key, by_extension) in &self.engines {
            let format: Format = format_key.parse()?;
            for (extension, engine) in by_extension {
                let extension = normalize_extension(extension);
                if extension.is_empty() {
                    return Err(ConfigError::EmptyExtension {
                        format: format_key.clone(),
                    });
                }
                entries.push((format, extension, engine));
            }
        }
        entries.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
        Ok(entries)
    }
}

/// Strip a leading dot so that `.html` and `html` register the same engine.
pub(crate) fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_owned()
}

use std::collections::HashMap;
use std::sync::Arc;

use mailwright_core::{ConfigError, Format};
use tracing::info;

use crate::config::{EngineKind, ViewsConfig, normalize_extension};
use crate::engine::{MiniJinjaEngine, TemplateEngine};

/// Maps format and file extension to a template engine.
///
/// Engines are stored behind `Arc<dyn TemplateEngine>` so they can be shared
/// across tasks. The registry is built once at startup and then shared as an
/// immutable reference or wrapped in an `Arc`; nothing mutates it while
/// messages are being processed.
#[derive(Default)]
pub struct EngineRegistry {
    engines: HashMap<Format, HashMap<String, Arc<dyn TemplateEngine>>>,
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for format in Format::ALL {
            map.entry(&format.as_str(), &self.extensions(format));
        }
        map.finish()
    }
}

impl EngineRegistry {
    /// Create an empty registry. Nothing is templated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configuration.
    ///
    /// Fails if a format key is unknown, an extension is empty, or a
    /// template directory does not exist.
    pub fn from_config(config: &ViewsConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for (format, extension, engine_config) in config.entries()? {
            if !engine_config.path.is_dir() {
                return Err(ConfigError::MissingTemplateDir {
                    format: format.to_string(),
                    extension,
                    path: engine_config.path.clone(),
                });
            }
            let engine: Arc<dyn TemplateEngine> = match engine_config.engine {
                EngineKind::Minijinja => Arc::new(MiniJinjaEngine::new(format, engine_config)),
            };
            info!(
                %format,
                extension = %extension,
                engine = engine.engine_name(),
                path = %engine_config.path.display(),
                "registered template engine"
            );
            registry.register(format, extension, engine);
        }
        Ok(registry)
    }

    /// Register an engine. A leading dot on `extension` is ignored.
    ///
    /// If an engine is already registered for the pair, it is replaced.
    pub fn register(
        &mut self,
        format: Format,
        extension: impl AsRef<str>,
        engine: Arc<dyn TemplateEngine>,
    ) {
        self.engines
            .entry(format)
            .or_default()
            .insert(normalize_extension(extension.as_ref()), engine);
    }

    /// Look up the engine for a format/extension pair.
    pub fn get(&self, format: Format, extension: &str) -> Option<&Arc<dyn TemplateEngine>> {
        self.engines.get(&format)?.get(extension)
    }

    /// Return `true` if an engine is registered for the pair.
    pub fn contains(&self, format: Format, extension: &str) -> bool {
        self.get(format, extension).is_some()
    }

    /// Return a sorted list of extensions registered for `format`.
    pub fn extensions(&self, format: Format) -> Vec<&str> {
        let mut extensions: Vec<&str> = self
            .engines
            .get(&format)
            .map(|by_ext| by_ext.keys().map(String::as_str).collect())
            .unwrap_or_default();
        extensions.sort_unstable();
        extensions
    }

    /// Return the number of registered format/extension pairs.
    pub fn len(&self) -> usize {
        self.engines.values().map(HashMap::len).sum()
    }

    /// Return `true` if no engines are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

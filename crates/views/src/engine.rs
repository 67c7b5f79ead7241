//! Template rendering engines.
//!
//! Renders template files against a message's context using `MiniJinja`
//! (Jinja2-compatible). Templates are looked up by path relative to the
//! engine's template directory.
//!
//! Engines registered for the `html` format escape every interpolated value
//! for HTML, whatever the template's file extension. Engines registered for
//! `text` never escape.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use mailwright_core::{Format, RenderError};
use minijinja::{AutoEscape, Environment, ErrorKind};
use tracing::debug;

use crate::config::EngineConfig;

/// A template engine registered for one format/extension pair.
///
/// Errors are returned as-is to the caller; engines never retry and never
/// fall back to another source.
#[async_trait]
pub trait TemplateEngine: Send + Sync + std::fmt::Debug {
    /// Render the template at `template` with `context`.
    async fn render(
        &self,
        template: &Path,
        context: &serde_json::Value,
    ) -> Result<String, RenderError>;

    /// Return the engine name (e.g. `"minijinja"`).
    fn engine_name(&self) -> &'static str;

    /// Directory templates are loaded from, if the engine reads from disk.
    fn template_dir(&self) -> Option<&Path> {
        None
    }
}

/// `MiniJinja` engine backed by a template directory or an in-memory set.
///
/// Rendering runs on Tokio's blocking pool since the engine is synchronous
/// and may read template files through its loader.
pub struct MiniJinjaEngine {
    env: Arc<Environment<'static>>,
    format: Format,
    template_dir: Option<PathBuf>,
    max_output_bytes: usize,
}

impl std::fmt::Debug for MiniJinjaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniJinjaEngine")
            .field("env", &"<Environment>")
            .field("format", &self.format)
            .field("template_dir", &self.template_dir)
            .field("max_output_bytes", &self.max_output_bytes)
            .finish()
    }
}

impl MiniJinjaEngine {
    /// Build an engine for `format` that loads templates from `config.path`.
    pub fn new(format: Format, config: &EngineConfig) -> Self {
        let mut env = environment(format, config.fuel);
        env.set_loader(minijinja::path_loader(config.path.clone()));
        Self {
            env: Arc::new(env),
            format,
            template_dir: Some(config.path.clone()),
            max_output_bytes: config.max_output_bytes,
        }
    }

    /// Build an engine from in-memory `(name, source)` pairs.
    ///
    /// Returns [`RenderError::Syntax`] for the first template that fails to
    /// parse.
    pub fn from_templates<I, N, S>(format: Format, templates: I) -> Result<Self, RenderError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let defaults = EngineConfig::new("");
        let mut env = environment(format, defaults.fuel);
        for (name, source) in templates {
            let name = name.into();
            env.add_template_owned(name.clone(), source.into())
                .map_err(|e| map_error(&name, &e))?;
        }
        Ok(Self {
            env: Arc::new(env),
            format,
            template_dir: None,
            max_output_bytes: defaults.max_output_bytes,
        })
    }

    #[must_use]
    pub fn with_max_output_bytes(mut self, limit: usize) -> Self {
        self.max_output_bytes = limit;
        self
    }

    pub fn format(&self) -> Format {
        self.format
    }
}

fn environment(format: Format, fuel: u64) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_fuel(Some(fuel));
    match format {
        Format::Html => env.set_auto_escape_callback(|_| AutoEscape::Html),
        Format::Text => env.set_auto_escape_callback(|_| AutoEscape::None),
    }
    env
}

#[async_trait]
impl TemplateEngine for MiniJinjaEngine {
    async fn render(
        &self,
        template: &Path,
        context: &serde_json::Value,
    ) -> Result<String, RenderError> {
        let name = template_name(template)?;
        let env = Arc::clone(&self.env);
        let ctx = minijinja::Value::from_serialize(context);

        debug!(template = %name, "rendering template");
        let task_name = name.clone();
        let rendered = tokio::task::spawn_blocking(move || {
            let tmpl = env
                .get_template(&task_name)
                .map_err(|e| map_error(&task_name, &e))?;
            tmpl.render(ctx).map_err(|e| map_error(&task_name, &e))
        })
        .await
        .map_err(|e| RenderError::Runtime {
            template: name.clone(),
            message: format!("render task failed: {e}"),
        })??;

        if rendered.len() > self.max_output_bytes {
            return Err(RenderError::OutputTooLarge {
                template: name,
                limit: self.max_output_bytes,
            });
        }

        Ok(rendered)
    }

    fn engine_name(&self) -> &'static str {
        "minijinja"
    }

    fn template_dir(&self) -> Option<&Path> {
        self.template_dir.as_deref()
    }
}

/// Loader name for a template path: components joined with `/`, with `.`
/// segments dropped.
///
/// Template paths are relative to the engine's directory. An absolute path
/// names no template and is reported as [`RenderError::NotFound`].
fn template_name(path: &Path) -> Result<String, RenderError> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy()),
            Component::ParentDir => parts.push("..".into()),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => {
                return Err(RenderError::NotFound(path.display().to_string()));
            }
        }
    }
    Ok(parts.join("/"))
}

fn map_error(template: &str, error: &minijinja::Error) -> RenderError {
    match error.kind() {
        ErrorKind::TemplateNotFound => RenderError::NotFound(template.to_owned()),
        ErrorKind::SyntaxError => RenderError::Syntax {
            template: template.to_owned(),
            message: error.to_string(),
        },
        _ => RenderError::Runtime {
            template: template.to_owned(),
            message: error.to_string(),
        },
    }
}

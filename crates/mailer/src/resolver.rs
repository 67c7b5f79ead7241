use std::path::{Path, PathBuf};
use std::sync::Arc;

use mailwright_core::{ContentField, ContentSource, Format, MailerError, RenderError, TemplateRef};
use mailwright_views::{EngineRegistry, FileLoader, StyleInliner, TemplateEngine, classify};
use serde_json::Value;
use tracing::{debug, instrument};

/// The resolved body of one format, with how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub format: Format,
    pub source: ContentSource,
    pub body: String,
}

/// Turns one content field into a string.
///
/// Template references with a registered engine are rendered, and rendered
/// HTML has its styles inlined when an inliner is configured, with relative
/// stylesheet links resolved next to the template. Other template references
/// are read from disk unchanged. Literal strings are returned as-is
/// without any I/O.
#[derive(Debug, Clone)]
pub struct FormatResolver {
    registry: Arc<EngineRegistry>,
    loader: Arc<dyn FileLoader>,
    inliner: Option<Arc<StyleInliner>>,
}

impl FormatResolver {
    pub fn new(registry: Arc<EngineRegistry>, loader: Arc<dyn FileLoader>) -> Self {
        Self {
            registry,
            loader,
            inliner: None,
        }
    }

    /// Inline styles into template-rendered HTML with `inliner`.
    #[must_use]
    pub fn with_inliner(mut self, inliner: Arc<StyleInliner>) -> Self {
        self.inliner = Some(inliner);
        self
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    pub fn inlines_styles(&self) -> bool {
        self.inliner.is_some()
    }

    #[instrument(skip_all, fields(%format))]
    pub async fn resolve(
        &self,
        format: Format,
        field: &ContentField,
        context: &Value,
    ) -> Result<Resolution, MailerError> {
        let source = classify(&self.registry, format, field);
        debug!(%source, "classified content field");

        let body = match (field, &source) {
            (ContentField::Template(template), ContentSource::Templated { extension }) => {
                let engine = self.engine(format, extension, template)?;
                debug!(
                    path = %template.path().display(),
                    engine = engine.engine_name(),
                    "rendering template"
                );
                let rendered = engine.render(template.path(), context).await?;
                match (&self.inliner, format) {
                    (Some(inliner), Format::Html) => {
                        let base_dir = engine
                            .template_dir()
                            .map(|dir| stylesheet_dir(dir, template.path()));
                        inliner.inline_relative_to(&rendered, base_dir.as_deref())
                    }
                    _ => rendered,
                }
            }
            (ContentField::Template(template), _) => {
                debug!(path = %template.path().display(), "reading raw content file");
                self.loader.load(template.path()).await?
            }
            (ContentField::Literal(text), _) => text.clone(),
        };

        Ok(Resolution {
            format,
            source,
            body,
        })
    }

    fn engine(
        &self,
        format: Format,
        extension: &str,
        template: &TemplateRef,
    ) -> Result<&Arc<dyn TemplateEngine>, RenderError> {
        self.registry
            .get(format, extension)
            .ok_or_else(|| RenderError::NotFound(template.path().display().to_string()))
    }
}

/// Directory holding the template file, which relative stylesheet links in
/// its output are resolved against.
fn stylesheet_dir(template_dir: &Path, template: &Path) -> PathBuf {
    let file = template_dir.join(template);
    file.parent()
        .map_or_else(|| template_dir.to_path_buf(), Path::to_path_buf)
}

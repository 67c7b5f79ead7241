use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One body of a message, as supplied by the caller.
///
/// On the wire a content field is either a bare string or an object with a
/// `path` key:
///
/// ```
/// use mailwright_core::ContentField;
///
/// let literal: ContentField = serde_json::from_str(r#""<p>Hi</p>""#).unwrap();
/// assert_eq!(literal, ContentField::from("<p>Hi</p>"));
///
/// let template: ContentField = serde_json::from_str(r#"{"path": "welcome.j2"}"#).unwrap();
/// assert_eq!(template, ContentField::template("welcome.j2"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentField {
    /// Sent verbatim.
    Literal(String),
    /// Rendered through a template engine when one is registered for the
    /// extension, otherwise read from disk as-is.
    Template(TemplateRef),
}

impl ContentField {
    /// Build a template reference field.
    pub fn template(path: impl Into<PathBuf>) -> Self {
        Self::Template(TemplateRef { path: path.into() })
    }
}

impl From<String> for ContentField {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for ContentField {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_owned())
    }
}

impl From<TemplateRef> for ContentField {
    fn from(value: TemplateRef) -> Self {
        Self::Template(value)
    }
}

/// A reference to a template or raw file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef {
    /// Path of the template. For registered engines it is resolved against the
    /// engine's template directory; for raw files it is used as given.
    pub path: PathBuf,
}

impl TemplateRef {
    /// The file extension without the leading dot, or `""` when the file name
    /// has none.
    pub fn extension(&self) -> &str {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The strategy used to turn a [`ContentField`] into its final string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Rendered by the engine registered for this extension.
    Templated { extension: String },
    /// Loaded from disk and sent unrendered.
    FileBacked,
    /// Sent verbatim.
    Literal,
}

impl ContentSource {
    /// Short label used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Templated { .. } => "templated",
            Self::FileBacked => "file",
            Self::Literal => "literal",
        }
    }
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Templated { extension } => write!(f, "templated(.{extension})"),
            other => f.write_str(other.as_str()),
        }
    }
}

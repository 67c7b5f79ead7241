use std::path::Path;

use css_inline::{CSSInliner, InlineError, Url};
use tracing::{debug, warn};

/// Moves stylesheet rules into per-element `style` attributes.
///
/// `<style>` blocks are consumed and removed. `<link rel="stylesheet">`
/// sheets are read and removed when linked-stylesheet loading is enabled,
/// and left in place otherwise. Relative links resolve against the directory
/// given to [`StyleInliner::inline_relative_to`].
///
/// A fragment comes back as a fragment: the parser's implied `<html>`,
/// `<head>` and `<body>` elements are not added to the output.
#[derive(Debug, Clone)]
pub struct StyleInliner {
    load_linked_stylesheets: bool,
}

impl Default for StyleInliner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StyleInliner {
    pub fn new(load_linked_stylesheets: bool) -> Self {
        Self {
            load_linked_stylesheets,
        }
    }

    /// Inline styles into `html`, resolving relative stylesheet links
    /// against the working directory.
    pub fn inline(&self, html: &str) -> String {
        self.inline_relative_to(html, None)
    }

    /// Inline styles into `html`, resolving relative stylesheet links
    /// against `base_dir`.
    ///
    /// Malformed markup is handled best-effort by the HTML parser. When a
    /// linked stylesheet cannot be loaded the links are left in place and
    /// `<style>` blocks are still inlined. If the document cannot be
    /// processed at all the input is returned unchanged.
    pub fn inline_relative_to(&self, html: &str, base_dir: Option<&Path>) -> String {
        let result = if self.load_linked_stylesheets {
            build(true, base_dir.and_then(directory_url))
                .inline(html)
                .or_else(|e| {
                    warn!(
                        error = %e,
                        "linked stylesheet not loaded, inlining style blocks only"
                    );
                    build(false, None).inline(html)
                })
        } else {
            build(false, None).inline(html)
        };

        match result {
            Ok(inlined) if is_fragment(html) => strip_document(&inlined).unwrap_or(inlined),
            Ok(inlined) => inlined,
            Err(e) => unchanged(html, &e),
        }
    }
}

fn build(load_linked_stylesheets: bool, base_url: Option<Url>) -> CSSInliner<'static> {
    CSSInliner::options()
        .keep_style_tags(false)
        .keep_link_tags(!load_linked_stylesheets)
        .load_remote_stylesheets(load_linked_stylesheets)
        .base_url(base_url)
        .build()
}

fn directory_url(dir: &Path) -> Option<Url> {
    let url = std::path::absolute(dir)
        .ok()
        .and_then(|dir| Url::from_directory_path(dir).ok());
    if url.is_none() {
        debug!(dir = %dir.display(), "no stylesheet base for directory");
    }
    url
}

fn unchanged(html: &str, error: &InlineError) -> String {
    warn!(error = %error, "style inlining failed, sending html unchanged");
    html.to_owned()
}

fn is_fragment(html: &str) -> bool {
    !html.to_ascii_lowercase().contains("<html")
}

/// Contents of the implied `<head>` and `<body>` of a parsed fragment.
fn strip_document(inlined: &str) -> Option<String> {
    let rest = inlined.trim_end().strip_prefix("<html><head>")?;
    let (head, rest) = rest.split_once("</head><body>")?;
    let body = rest.strip_suffix("</body></html>")?;
    Some(format!("{head}{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLED: &str = "<html><head><style>p { color: red; text-decoration: underline; } \
                          strong { font-weight: bold; }</style></head>\
                          <body><p>test <strong>test</strong> test</p></body></html>";

    fn compact(html: &str) -> String {
        html.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn style_block_is_inlined_and_removed() {
        let inlined = StyleInliner::default().inline(STYLED);
        assert!(!inlined.contains("<style"));
        assert!(inlined.contains("<p style="));
        assert!(inlined.contains("<strong style="));

        let compact = compact(&inlined);
        assert!(compact.contains("color:red"));
        assert!(compact.contains("text-decoration:underline"));
        assert!(compact.contains("font-weight:bold"));
    }

    #[test]
    fn text_content_is_preserved() {
        let inlined = StyleInliner::default().inline(STYLED);
        assert!(inlined.contains("test </p>") || inlined.contains("</strong> test"));
        assert_eq!(inlined.matches("test").count(), 3);
    }

    #[test]
    fn existing_inline_style_is_kept() {
        let html = "<html><head><style>p { color: red; }</style></head>\
                    <body><p style=\"margin: 0\">x</p></body></html>";
        let compact = compact(&StyleInliner::default().inline(html));
        assert!(compact.contains("margin:0"));
        assert!(compact.contains("color:red"));
    }

    #[test]
    fn unstyled_document_keeps_its_content() {
        let html = "<html><head></head><body><p>NODEMAILER</p></body></html>";
        let inlined = StyleInliner::default().inline(html);
        assert!(inlined.contains("<p>NODEMAILER</p>"));
    }

    fn fixtures() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    #[test]
    fn relative_link_resolves_against_base_dir() {
        let html = "<html><head><link rel=\"stylesheet\" href=\"email.css\">\
                    <style>p { color: red; }</style></head>\
                    <body><p class=\"note\">x</p></body></html>";
        let inlined = StyleInliner::new(true).inline_relative_to(html, Some(&fixtures()));

        assert!(!inlined.contains("<link"));
        assert!(!inlined.contains("<style"));
        let compact = compact(&inlined);
        assert!(compact.contains("font-style:italic"));
        assert!(compact.contains("color:red"));
    }

    #[test]
    fn unreadable_linked_stylesheet_still_inlines_style_blocks() {
        let html = "<html><head><link rel=\"stylesheet\" href=\"missing.css\">\
                    <style>p { color: red; }</style></head><body><p>x</p></body></html>";
        let inlined = StyleInliner::new(true).inline_relative_to(html, Some(&fixtures()));

        assert!(inlined.contains("<link"));
        assert!(!inlined.contains("<style"));
        assert!(compact(&inlined).contains("<pstyle=\"color:red"));
    }

    #[test]
    fn fragment_is_not_wrapped_in_a_document() {
        let inlined = StyleInliner::new(false).inline("<style>p { color: red; }</style><p>x</p>");

        assert!(!inlined.contains("<html"));
        assert!(!inlined.contains("<head"));
        assert!(!inlined.contains("<body"));
        assert!(inlined.starts_with("<p style="));
        assert!(inlined.ends_with(">x</p>"));
    }

    #[test]
    fn fragment_keeps_unloaded_links() {
        let inlined = StyleInliner::new(false)
            .inline("<link rel=\"stylesheet\" href=\"email.css\"><p>x</p>");
        assert!(inlined.starts_with("<link"));
        assert!(inlined.ends_with("<p>x</p>"));
        assert!(!inlined.contains("<body"));
    }

    #[test]
    fn full_document_keeps_its_structure() {
        let inlined = StyleInliner::default().inline(STYLED);
        assert!(inlined.starts_with("<html><head>"));
        assert!(inlined.contains("<body>"));
    }

    #[test]
    fn strip_document_requires_the_implied_wrapper() {
        assert_eq!(
            strip_document("<html><head></head><body><p>x</p></body></html>").as_deref(),
            Some("<p>x</p>")
        );
        assert_eq!(strip_document("<html lang=\"en\"><head></head><body></body></html>"), None);
    }

    #[test]
    fn linked_stylesheet_kept_when_loading_disabled() {
        let html = "<html><head><link rel=\"stylesheet\" href=\"/definitely/missing.css\">\
                    <style>p { color: red; }</style></head><body><p>x</p></body></html>";
        let inlined = StyleInliner::new(false).inline(html);
        assert!(inlined.contains("<link"));
        assert!(!inlined.contains("<style"));
        assert!(compact(&inlined).contains("color:red"));
    }
}

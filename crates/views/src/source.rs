use mailwright_core::{ContentField, ContentSource, Format};

use crate::registry::EngineRegistry;

/// Decide how `field` should be resolved for `format`.
///
/// A template reference is rendered when an engine is registered for its
/// extension under this format, and read from disk unrendered otherwise.
/// Plain strings are literal. Never fails.
pub fn classify(registry: &EngineRegistry, format: Format, field: &ContentField) -> ContentSource {
    match field {
        ContentField::Literal(_) => ContentSource::Literal,
        ContentField::Template(template) => {
            let extension = template.extension();
            if registry.contains(format, extension) {
                ContentSource::Templated {
                    extension: extension.to_owned(),
                }
            } else {
                ContentSource::FileBacked
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::MiniJinjaEngine;

    fn registry() -> EngineRegistry {
        let mut registry = EngineRegistry::new();
        registry.register(
            Format::Html,
            "hbs",
            Arc::new(MiniJinjaEngine::from_templates(Format::Html, [("a.hbs", "")]).unwrap()),
        );
        registry
    }

    #[test]
    fn registered_extension_is_templated() {
        let source = classify(&registry(), Format::Html, &ContentField::template("a.hbs"));
        assert_eq!(
            source,
            ContentSource::Templated {
                extension: "hbs".to_owned()
            }
        );
    }

    #[test]
    fn extension_registered_for_other_format_is_file_backed() {
        let source = classify(&registry(), Format::Text, &ContentField::template("T.hbs"));
        assert_eq!(source, ContentSource::FileBacked);
    }

    #[test]
    fn unregistered_extension_is_file_backed() {
        let source = classify(&registry(), Format::Html, &ContentField::template("a.html"));
        assert_eq!(source, ContentSource::FileBacked);

        let no_extension = classify(&registry(), Format::Html, &ContentField::template("body"));
        assert_eq!(no_extension, ContentSource::FileBacked);
    }

    #[test]
    fn string_is_literal_even_if_it_looks_like_a_path() {
        let source = classify(&registry(), Format::Html, &ContentField::from("a.hbs"));
        assert_eq!(source, ContentSource::Literal);
    }

    #[test]
    fn empty_registry_never_templates() {
        let registry = EngineRegistry::new();
        for format in Format::ALL {
            let source = classify(&registry, format, &ContentField::template("a.hbs"));
            assert_eq!(source, ContentSource::FileBacked);
        }
    }
}

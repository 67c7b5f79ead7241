//! Compile hooks run over every outgoing email before it reaches a backend.
//!
//! Hooks see the final payload, so they apply uniformly no matter how the
//! bodies were produced (rendered, loaded from disk, or literal).

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use mailwright_core::TransportError;
use regex::{Captures, Regex};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::{InlinePart, OutgoingEmail};

/// A transformation applied to an outgoing email before delivery.
pub trait CompileHook: Send + Sync + std::fmt::Debug {
    /// Return the hook name, used in logs.
    fn name(&self) -> &'static str;

    /// Rewrite `email` in place.
    fn apply(&self, email: &mut OutgoingEmail) -> Result<(), TransportError>;
}

/// Matches an `<img>` tag up to a `data:` URI in its `src` attribute.
///
/// Captures: 1 = tag prefix through `src=`, 2 = opening quote, 3 = MIME type,
/// 4 = base64 payload, 5 = closing quote.
static DATA_URI_IMG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(<img\b[^>]*?\ssrc\s*=\s*)(["'])data:([a-z0-9.+-]+/[a-z0-9.+-]+);base64,([^"']*)(["'])"#,
    )
    .expect("data URI regex is valid")
});

/// Turns base64 `data:` image sources into inline MIME parts.
///
/// Each `<img src="data:image/png;base64,...">` in the HTML body becomes
/// `<img src="cid:<id>">` and the decoded bytes are attached as an inline part
/// with that content ID. Sources that are not data URIs, or whose payload is
/// not valid base64, are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineImages;

impl InlineImages {
    pub fn new() -> Self {
        Self
    }
}

impl CompileHook for InlineImages {
    fn name(&self) -> &'static str {
        "inline_images"
    }

    fn apply(&self, email: &mut OutgoingEmail) -> Result<(), TransportError> {
        let Some(html) = email.html.as_deref() else {
            return Ok(());
        };

        let mut parts = Vec::new();
        let rewritten = DATA_URI_IMG_RE.replace_all(html, |caps: &Captures<'_>| {
            let original = caps[0].to_owned();
            if caps[2] != caps[5] {
                return original;
            }

            let payload: String = caps[4].chars().filter(|c| !c.is_whitespace()).collect();
            let data = match B64.decode(payload.as_bytes()) {
                Ok(data) => data,
                Err(e) => {
                    warn!(error = %e, "leaving undecodable data URI image in place");
                    return original;
                }
            };

            let content_id = format!("{}@mailwright", Uuid::new_v4().simple());
            let quote = &caps[2];
            let replacement = format!("{}{quote}cid:{content_id}{quote}", &caps[1]);
            parts.push(InlinePart {
                content_id,
                content_type: caps[3].to_ascii_lowercase(),
                data,
            });
            replacement
        });

        if parts.is_empty() {
            return Ok(());
        }

        debug!(count = parts.len(), "inlined data URI images");
        email.html = Some(rewritten.into_owned());
        email.inline_parts.extend(parts);
        Ok(())
    }
}

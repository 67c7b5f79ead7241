use serde::{Deserialize, Serialize};

use crate::content::ContentField;
use crate::format::Format;

/// Addressing and subject of a message. Opaque to content resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Sender address. When absent the mailer's configured default is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Recipient address, or a comma-separated list of addresses.
    pub to: String,

    /// Subject line.
    pub subject: String,

    /// Optional CC recipients (comma-separated or single address).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,

    /// Optional BCC recipients (comma-separated or single address).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<String>,

    /// Optional reply-to address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// A message as submitted to the mailer, before its bodies are resolved.
///
/// # Examples
///
/// ```
/// use mailwright_core::{ContentField, Format, Message};
///
/// let json = serde_json::json!({
///     "to": "user@example.com",
///     "subject": "Welcome",
///     "text": "Hello!",
///     "html": {"path": "welcome.html"},
///     "context": {"name": "Ada"}
/// });
/// let message: Message = serde_json::from_value(json).unwrap();
/// assert_eq!(message.formats(), vec![Format::Text, Format::Html]);
/// assert_eq!(message.content(Format::Text), Some(&ContentField::from("Hello!")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(flatten)]
    pub envelope: Envelope,

    /// Plain-text body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<ContentField>,

    /// HTML body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<ContentField>,

    /// Data handed to template engines. Never sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl Message {
    /// Create a message with no bodies.
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            envelope: Envelope {
                to: to.into(),
                subject: subject.into(),
                ..Envelope::default()
            },
            text: None,
            html: None,
            context: None,
        }
    }

    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.envelope.from = Some(from.into());
        self
    }

    #[must_use]
    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.envelope.cc = Some(cc.into());
        self
    }

    #[must_use]
    pub fn with_bcc(mut self, bcc: impl Into<String>) -> Self {
        self.envelope.bcc = Some(bcc.into());
        self
    }

    #[must_use]
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.envelope.reply_to = Some(reply_to.into());
        self
    }

    /// Set the plain-text body.
    #[must_use]
    pub fn with_text(mut self, field: impl Into<ContentField>) -> Self {
        self.text = Some(field.into());
        self
    }

    /// Set the HTML body.
    #[must_use]
    pub fn with_html(mut self, field: impl Into<ContentField>) -> Self {
        self.html = Some(field.into());
        self
    }

    /// Set the rendering context.
    #[must_use]
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    /// The content field for `format`, if set.
    pub fn content(&self, format: Format) -> Option<&ContentField> {
        match format {
            Format::Text => self.text.as_ref(),
            Format::Html => self.html.as_ref(),
        }
    }

    /// Formats this message actually sets.
    pub fn formats(&self) -> Vec<Format> {
        Format::ALL
            .into_iter()
            .filter(|format| self.content(*format).is_some())
            .collect()
    }

    /// Split the message into its envelope, the content fields that are set,
    /// and the rendering context.
    pub fn into_parts(
        self,
    ) -> (
        Envelope,
        Vec<(Format, ContentField)>,
        Option<serde_json::Value>,
    ) {
        let fields = [(Format::Text, self.text), (Format::Html, self.html)]
            .into_iter()
            .filter_map(|(format, field)| field.map(|field| (format, field)))
            .collect();
        (self.envelope, fields, self.context)
    }
}

/// A message whose bodies have all been resolved to strings.
///
/// There is deliberately no `context` here: once a message reaches this type
/// the rendering data is gone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMessage {
    #[serde(flatten)]
    pub envelope: Envelope,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl ResolvedMessage {
    pub fn new(envelope: Envelope) -> Self {
        Self {
            envelope,
            text: None,
            html: None,
        }
    }

    /// Store the resolved body for `format`.
    pub fn set_body(&mut self, format: Format, body: String) {
        match format {
            Format::Text => self.text = Some(body),
            Format::Html => self.html = Some(body),
        }
    }

    pub fn body(&self, format: Format) -> Option<&str> {
        match format {
            Format::Text => self.text.as_deref(),
            Format::Html => self.html.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_minimal_message() {
        let json = serde_json::json!({
            "to": "recipient@example.com",
            "subject": "Test Subject"
        });
        let message: Message = serde_json::from_value(json).unwrap();
        assert_eq!(message.envelope.to, "recipient@example.com");
        assert_eq!(message.envelope.subject, "Test Subject");
        assert!(message.envelope.from.is_none());
        assert!(message.formats().is_empty());
        assert!(message.context.is_none());
    }

    #[test]
    fn deserialize_missing_subject_fails() {
        let json = serde_json::json!({ "to": "user@example.com" });
        assert!(serde_json::from_value::<Message>(json).is_err());
    }

    #[test]
    fn formats_only_lists_present_fields() {
        let message = Message::new("a@example.com", "s").with_html("<p>x</p>");
        assert_eq!(message.formats(), vec![Format::Html]);
        assert!(message.content(Format::Text).is_none());
    }

    #[test]
    fn into_parts_separates_context() {
        let message = Message::new("a@example.com", "s")
            .with_from("b@example.com")
            .with_text(ContentField::template("t.txt"))
            .with_context(serde_json::json!({"content": "X"}));

        let (envelope, fields, context) = message.into_parts();
        assert_eq!(envelope.from.as_deref(), Some("b@example.com"));
        assert_eq!(fields, vec![(Format::Text, ContentField::template("t.txt"))]);
        assert_eq!(context, Some(serde_json::json!({"content": "X"})));
    }

    #[test]
    fn resolved_message_never_serializes_context() {
        let mut resolved = ResolvedMessage::new(Envelope {
            to: "a@example.com".to_owned(),
            subject: "s".to_owned(),
            ..Envelope::default()
        });
        resolved.set_body(Format::Html, "<p>hi</p>".to_owned());

        let json = serde_json::to_value(&resolved).unwrap();
        assert!(json.get("context").is_none());
        assert_eq!(json["html"], "<p>hi</p>");
        assert!(json.get("text").is_none());
        assert_eq!(resolved.body(Format::Html), Some("<p>hi</p>"));
    }
}

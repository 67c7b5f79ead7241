use async_trait::async_trait;
use mailwright_core::{ResolvedMessage, TransportError};

/// A fully-resolved email as handed to a backend.
///
/// Built from a [`ResolvedMessage`] once the sender has been defaulted. Compile
/// hooks may rewrite the bodies and add inline parts before delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Sender email address.
    pub from: String,
    /// Recipient address or comma-separated list.
    pub to: String,
    /// Email subject line.
    pub subject: String,
    /// Optional plain-text body.
    pub text: Option<String>,
    /// Optional HTML body.
    pub html: Option<String>,
    /// Optional CC address.
    pub cc: Option<String>,
    /// Optional BCC address.
    pub bcc: Option<String>,
    /// Optional reply-to address.
    pub reply_to: Option<String>,
    /// Parts referenced from the HTML body by `cid:` URLs.
    pub inline_parts: Vec<InlinePart>,
}

impl OutgoingEmail {
    /// Convert a resolved message, using `default_from` when it has no sender.
    pub fn from_resolved(message: ResolvedMessage, default_from: &str) -> Self {
        let envelope = message.envelope;
        Self {
            from: envelope.from.unwrap_or_else(|| default_from.to_owned()),
            to: envelope.to,
            subject: envelope.subject,
            text: message.text,
            html: message.html,
            cc: envelope.cc,
            bcc: envelope.bcc,
            reply_to: envelope.reply_to,
            inline_parts: Vec::new(),
        }
    }
}

/// A related MIME part embedded in the HTML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePart {
    /// Value of the `Content-ID` header, without angle brackets.
    pub content_id: String,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    /// Decoded bytes.
    pub data: Vec<u8>,
}

/// Result of a successful send.
#[derive(Debug, Clone)]
pub struct EmailResult {
    /// Message identifier (if available).
    pub message_id: Option<String>,
    /// Human-readable status (e.g. `"sent"`, `"recorded"`).
    pub status: String,
    /// The formatted RFC 5322 message, for backends that keep it.
    pub response: Option<String>,
}

/// Trait for pluggable email delivery backends.
///
/// Implementations handle the actual transport of email messages (SMTP, stub)
/// while [`MailTransport`](crate::transport::MailTransport) runs compile hooks
/// and hands the result over.
#[async_trait]
pub trait EmailBackend: Send + Sync + std::fmt::Debug {
    /// Send an email through this backend.
    async fn send(&self, email: &OutgoingEmail) -> Result<EmailResult, TransportError>;

    /// Perform a health check to verify the backend is operational.
    async fn health_check(&self) -> Result<(), TransportError>;

    /// Return the backend name (e.g. `"smtp"`, `"stub"`).
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use mailwright_core::Envelope;

    use super::*;

    #[test]
    fn from_resolved_defaults_sender() {
        let resolved = ResolvedMessage {
            envelope: Envelope {
                to: "to@example.com".to_owned(),
                subject: "test".to_owned(),
                ..Envelope::default()
            },
            text: Some("hi".to_owned()),
            html: None,
        };
        let email = OutgoingEmail::from_resolved(resolved, "noreply@example.com");
        assert_eq!(email.from, "noreply@example.com");
        assert_eq!(email.text.as_deref(), Some("hi"));
        assert!(email.html.is_none());
        assert!(email.inline_parts.is_empty());
    }

    #[test]
    fn from_resolved_keeps_explicit_sender() {
        let resolved = ResolvedMessage {
            envelope: Envelope {
                from: Some("from@example.com".to_owned()),
                to: "to@example.com".to_owned(),
                subject: "test".to_owned(),
                reply_to: Some("reply@example.com".to_owned()),
                ..Envelope::default()
            },
            text: None,
            html: None,
        };
        let email = OutgoingEmail::from_resolved(resolved, "noreply@example.com");
        assert_eq!(email.from, "from@example.com");
        assert_eq!(email.reply_to.as_deref(), Some("reply@example.com"));
    }
}

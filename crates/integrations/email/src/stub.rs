use async_trait::async_trait;
use mailwright_core::TransportError;
use parking_lot::Mutex;
use tracing::info;

use crate::backend::{EmailBackend, EmailResult, OutgoingEmail};
use crate::message::build_message;

/// A backend that builds the full message and keeps it instead of sending.
///
/// The formatted RFC 5322 message is returned in
/// [`EmailResult::response`]. Useful for dry runs, local development, and
/// tests that want to inspect exactly what would have gone over the wire.
#[derive(Debug, Default)]
pub struct StubBackend {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails recorded so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().clone()
    }

    /// Number of emails recorded so far.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl EmailBackend for StubBackend {
    async fn send(&self, email: &OutgoingEmail) -> Result<EmailResult, TransportError> {
        let message = build_message(email)?;
        let message_id = message
            .headers()
            .get_raw("Message-ID")
            .map(ToOwned::to_owned);
        let formatted = String::from_utf8_lossy(&message.formatted()).into_owned();

        info!(
            to = %email.to,
            subject = %email.subject,
            bytes = formatted.len(),
            "stub backend recorded email"
        );
        self.sent.lock().push(email.clone());

        Ok(EmailResult {
            message_id,
            status: "recorded".to_owned(),
            response: Some(formatted),
        })
    }

    #[allow(clippy::unused_async)]
    async fn health_check(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            from: "from@example.com".to_owned(),
            to: "to@example.com".to_owned(),
            subject: "test".to_owned(),
            text: None,
            html: Some("<p>NODEMAILER</p>".to_owned()),
            cc: None,
            bcc: None,
            reply_to: None,
            inline_parts: Vec::new(),
        }
    }

    #[tokio::test]
    async fn records_and_returns_formatted_message() {
        let backend = StubBackend::new();
        let result = backend.send(&email()).await.unwrap();

        assert_eq!(result.status, "recorded");
        assert!(result.message_id.is_some());
        let response = result.response.unwrap();
        assert!(response.contains("<p>NODEMAILER</p>"));
        assert!(response.contains("Subject: test"));

        assert_eq!(backend.sent_count(), 1);
        assert_eq!(backend.sent()[0], email());
    }

    #[tokio::test]
    async fn invalid_email_is_not_recorded() {
        let backend = StubBackend::new();
        let mut bad = email();
        bad.to = "nope".to_owned();
        assert!(backend.send(&bad).await.is_err());
        assert_eq!(backend.sent_count(), 0);
    }

    #[tokio::test]
    async fn health_check_passes() {
        let backend = StubBackend::new();
        backend.health_check().await.unwrap();
        assert_eq!(backend.backend_name(), "stub");
    }
}

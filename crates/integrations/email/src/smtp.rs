use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use mailwright_core::TransportError;
use tracing::{debug, error, info};

use crate::backend::{EmailBackend, EmailResult, OutgoingEmail};
use crate::config::SmtpConfig;
use crate::message::build_message;

/// SMTP email delivery backend using `lettre`.
pub struct SmtpBackend {
    config: SmtpConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl std::fmt::Debug for SmtpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpBackend")
            .field("config", &self.config)
            .field("transport", &"<AsyncSmtpTransport>")
            .finish()
    }
}

impl SmtpBackend {
    /// Create a new `SmtpBackend` from the given SMTP configuration.
    pub fn new(config: SmtpConfig) -> Result<Self, TransportError> {
        let transport = build_transport(&config)?;
        Ok(Self { config, transport })
    }

    /// Create a `SmtpBackend` with a pre-built transport (for testing).
    pub fn with_transport(
        config: SmtpConfig,
        transport: AsyncSmtpTransport<Tokio1Executor>,
    ) -> Self {
        Self { config, transport }
    }
}

#[async_trait]
impl EmailBackend for SmtpBackend {
    async fn send(&self, email: &OutgoingEmail) -> Result<EmailResult, TransportError> {
        debug!(to = %email.to, subject = %email.subject, "building SMTP message");
        let message = build_message(email)?;
        let message_id = message
            .headers()
            .get_raw("Message-ID")
            .map(ToOwned::to_owned);

        info!(to = %email.to, subject = %email.subject, "sending email via SMTP");
        let response = self.transport.send(message).await.map_err(|e| {
            error!(error = %e, "SMTP send failed");
            map_smtp_error(&e)
        })?;

        info!(to = %email.to, code = %response.code(), "email sent successfully via SMTP");
        Ok(EmailResult {
            message_id,
            status: "sent".to_owned(),
            response: Some(response.message().collect::<Vec<_>>().join("\n")),
        })
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        debug!("performing SMTP health check");
        self.transport.test_connection().await.map_err(|e| {
            error!(error = %e, "SMTP health check failed");
            TransportError::Connection(format!("SMTP health check failed: {e}"))
        })?;
        info!("SMTP health check passed");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "smtp"
    }
}

/// Build an async SMTP transport from the given configuration.
fn build_transport(
    config: &SmtpConfig,
) -> Result<AsyncSmtpTransport<Tokio1Executor>, TransportError> {
    let builder = if config.tls {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| TransportError::Configuration(format!("SMTP TLS relay error: {e}")))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
    };

    let builder = builder.port(config.smtp_port);

    let builder = if let (Some(user), Some(pass)) = (&config.username, &config.password) {
        builder.credentials(Credentials::new(user.clone(), pass.clone()))
    } else {
        builder
    };

    Ok(builder.build())
}

/// Map a lettre SMTP error to the appropriate `TransportError` variant.
fn map_smtp_error(error: &lettre::transport::smtp::Error) -> TransportError {
    let message = error.to_string();

    if error.is_transient() {
        TransportError::Connection(format!("transient SMTP error: {message}"))
    } else if error.is_permanent() {
        TransportError::Rejected(format!("permanent SMTP error: {message}"))
    } else {
        TransportError::Connection(format!("SMTP error: {message}"))
    }
}

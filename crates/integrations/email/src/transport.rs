use std::sync::Arc;

use mailwright_core::{ResolvedMessage, TransportError};
use tracing::{debug, info, instrument};

use crate::backend::{EmailBackend, EmailResult, OutgoingEmail};
use crate::config::{BackendKind, TransportConfig};
use crate::hooks::CompileHook;
use crate::smtp::SmtpBackend;
use crate::stub::StubBackend;

/// Hands resolved messages to a delivery backend.
///
/// Before delivery the configured compile hooks run, in registration order,
/// over the outgoing payload. Backend errors are returned unchanged.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use mailwright_email::{InlineImages, MailTransport, StubBackend};
///
/// let transport = MailTransport::with_backend("noreply@example.com", Arc::new(StubBackend::new()))
///     .with_hook(InlineImages::new());
/// assert_eq!(transport.backend_name(), "stub");
/// assert_eq!(transport.hook_names(), vec!["inline_images"]);
/// ```
pub struct MailTransport {
    default_from: String,
    backend: Arc<dyn EmailBackend>,
    hooks: Vec<Box<dyn CompileHook>>,
}

impl std::fmt::Debug for MailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailTransport")
            .field("default_from", &self.default_from)
            .field("backend", &self.backend)
            .field("hooks", &self.hook_names())
            .finish()
    }
}

impl MailTransport {
    /// Create a transport with the backend selected by `config`.
    ///
    /// Returns a [`TransportError::Configuration`] if the SMTP transport
    /// cannot be built.
    pub fn new(
        config: &TransportConfig,
        default_from: impl Into<String>,
    ) -> Result<Self, TransportError> {
        let backend: Arc<dyn EmailBackend> = match config.backend {
            BackendKind::Smtp => Arc::new(SmtpBackend::new(config.smtp_config())?),
            BackendKind::Stub => Arc::new(StubBackend::new()),
        };
        Ok(Self::with_backend(default_from, backend))
    }

    /// Create a transport around a pre-built backend.
    pub fn with_backend(default_from: impl Into<String>, backend: Arc<dyn EmailBackend>) -> Self {
        Self {
            default_from: default_from.into(),
            backend,
            hooks: Vec::new(),
        }
    }

    /// Append a compile hook to the chain.
    #[must_use]
    pub fn with_hook(mut self, hook: impl CompileHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Names of the registered hooks, in the order they run.
    pub fn hook_names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Run the hook chain over `message` and deliver it.
    #[instrument(skip_all, fields(backend = self.backend.backend_name()))]
    pub async fn send(&self, message: ResolvedMessage) -> Result<EmailResult, TransportError> {
        let mut email = OutgoingEmail::from_resolved(message, &self.default_from);

        for hook in &self.hooks {
            debug!(hook = hook.name(), "applying compile hook");
            hook.apply(&mut email)?;
        }

        let result = self.backend.send(&email).await?;
        info!(
            to = %email.to,
            status = %result.status,
            message_id = result.message_id.as_deref().unwrap_or("-"),
            "email handed to backend"
        );
        Ok(result)
    }

    /// Perform a health check on the backend.
    pub async fn health_check(&self) -> Result<(), TransportError> {
        self.backend.health_check().await
    }
}

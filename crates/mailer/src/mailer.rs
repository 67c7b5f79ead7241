use std::sync::Arc;

use mailwright_core::{ConfigError, Format, MailerError, Message, ResolvedMessage};
use mailwright_email::{EmailResult, InlineImages, MailTransport};
use mailwright_views::{EngineRegistry, FsLoader, StyleInliner};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::MailerConfig;
use crate::join::try_join_keyed;
use crate::resolver::FormatResolver;

/// Where a single send is in its lifecycle.
///
/// `Delivered`, `TransportFailed` and `ResolutionFailed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Resolving,
    AllResolved,
    ResolutionFailed,
    Sending,
    Delivered,
    TransportFailed,
}

impl SendState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::AllResolved => "all_resolved",
            Self::ResolutionFailed => "resolution_failed",
            Self::Sending => "sending",
            Self::Delivered => "delivered",
            Self::TransportFailed => "transport_failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Delivered | Self::TransportFailed | Self::ResolutionFailed
        )
    }
}

impl std::fmt::Display for SendState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enter(state: SendState) {
    debug!(state = state.as_str(), terminal = state.is_terminal(), "send state");
}

/// Resolves the bodies of a message and hands it to the transport.
///
/// Every body the message sets is resolved concurrently. If any of them fails
/// the send is abandoned and that error is returned; the transport is never
/// called. The rendering context is dropped before the message leaves the
/// mailer.
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use std::sync::Arc;
///
/// use mailwright_core::Message;
/// use mailwright_email::{MailTransport, StubBackend};
/// use mailwright_mailer::{FormatResolver, Mailer};
/// use mailwright_views::{EngineRegistry, FsLoader};
///
/// let resolver = FormatResolver::new(Arc::new(EngineRegistry::new()), Arc::new(FsLoader::new()));
/// let backend = Arc::new(StubBackend::new());
/// let mailer = Mailer::new(
///     resolver,
///     MailTransport::with_backend("noreply@example.com", backend.clone()),
/// );
///
/// let message = Message::new("user@example.com", "Hi").with_text("Hello!");
/// mailer.send(message).await.unwrap();
/// assert_eq!(backend.sent()[0].text.as_deref(), Some("Hello!"));
/// # }
/// ```
#[derive(Debug)]
pub struct Mailer {
    resolver: Arc<FormatResolver>,
    transport: MailTransport,
}

impl Mailer {
    pub fn new(resolver: FormatResolver, transport: MailTransport) -> Self {
        Self {
            resolver: Arc::new(resolver),
            transport,
        }
    }

    /// Build a mailer from configuration.
    ///
    /// Validates the configuration, registers the configured template
    /// engines, and selects the transport backend. Must be called from within
    /// a Tokio runtime when the SMTP backend is selected.
    pub fn from_config(config: &MailerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let registry = Arc::new(EngineRegistry::from_config(&config.views)?);
        let mut resolver = FormatResolver::new(registry, Arc::new(FsLoader::new()));
        if config.inline_styles {
            resolver = resolver.with_inliner(Arc::new(StyleInliner::new(
                config.load_linked_stylesheets,
            )));
        }

        let mut transport = MailTransport::new(&config.transport, config.default_from.clone())
            .map_err(|e| ConfigError::Transport(e.to_string()))?;
        if config.inline_images {
            transport = transport.with_hook(InlineImages::new());
        }

        info!(
            engines = resolver.registry().len(),
            inline_styles = config.inline_styles,
            inline_images = config.inline_images,
            backend = transport.backend_name(),
            "mailer configured"
        );
        Ok(Self::new(resolver, transport))
    }

    pub fn resolver(&self) -> &FormatResolver {
        &self.resolver
    }

    pub fn transport(&self) -> &MailTransport {
        &self.transport
    }

    /// Resolve every body of `message` without sending it.
    ///
    /// The returned message has no rendering context. Compile hooks have not
    /// run yet; they belong to the transport.
    #[instrument(skip_all, fields(to = %message.envelope.to))]
    pub async fn resolve(&self, message: Message) -> Result<ResolvedMessage, MailerError> {
        enter(SendState::Idle);
        self.resolve_bodies(message).await
    }

    /// Resolve every body of `message` and deliver the result.
    #[instrument(skip_all, fields(to = %message.envelope.to))]
    pub async fn send(&self, message: Message) -> Result<EmailResult, MailerError> {
        enter(SendState::Idle);
        let resolved = self.resolve_bodies(message).await?;

        enter(SendState::Sending);
        match self.transport.send(resolved).await {
            Ok(result) => {
                enter(SendState::Delivered);
                Ok(result)
            }
            Err(e) => {
                enter(SendState::TransportFailed);
                warn!(error = %e, retryable = e.is_retryable(), "transport failed");
                Err(e.into())
            }
        }
    }

    async fn resolve_bodies(&self, message: Message) -> Result<ResolvedMessage, MailerError> {
        let (envelope, fields, context) = message.into_parts();
        let context = Arc::new(context.unwrap_or(Value::Null));
        let formats: Vec<Format> = fields.iter().map(|(format, _)| *format).collect();

        enter(SendState::Resolving);
        debug!(?formats, "resolving message bodies");

        let tasks = fields.into_iter().map(|(format, field)| {
            let resolver = Arc::clone(&self.resolver);
            let context = Arc::clone(&context);
            (format, async move {
                resolver.resolve(format, &field, &context).await
            })
        });

        let resolutions = match try_join_keyed(tasks).await {
            Ok(resolutions) => resolutions,
            Err(e) => {
                enter(SendState::ResolutionFailed);
                warn!(error = %e, "content resolution failed, message not sent");
                return Err(e);
            }
        };

        let mut resolved = ResolvedMessage::new(envelope);
        for (format, resolution) in resolutions {
            debug!(%format, source = %resolution.source, bytes = resolution.body.len(), "resolved body");
            resolved.set_body(format, resolution.body);
        }
        enter(SendState::AllResolved);
        Ok(resolved)
    }
}

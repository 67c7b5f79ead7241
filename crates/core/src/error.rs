use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a template engine.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No template with this name exists in the engine's template directory.
    #[error("template not found: {0}")]
    NotFound(String),

    /// The template failed to parse.
    #[error("syntax error in template '{template}': {message}")]
    Syntax { template: String, message: String },

    /// The template parsed but failed while rendering.
    #[error("error rendering template '{template}': {message}")]
    Runtime { template: String, message: String },

    /// The rendered output exceeded the engine's size limit.
    #[error("rendered output of '{template}' exceeds maximum size of {limit} bytes")]
    OutputTooLarge { template: String, limit: usize },
}

/// A raw content file could not be read.
#[derive(Debug, Error)]
#[error("failed to read {}: {source}", path.display())]
pub struct ReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl ReadError {
    pub fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> std::io::ErrorKind {
        self.source.kind()
    }
}

/// Errors raised while handing a message to the delivery backend.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A sender or recipient address could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The MIME message could not be assembled.
    #[error("failed to build email: {0}")]
    Build(String),

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The server refused the message.
    #[error("message rejected: {0}")]
    Rejected(String),

    /// The backend was given invalid configuration.
    #[error("invalid transport configuration: {0}")]
    Configuration(String),
}

impl TransportError {
    /// Returns `true` if the error is transient and the send may succeed on
    /// retry. The mailer itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Errors raised while validating configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error(transparent)]
    UnknownFormat(#[from] crate::format::UnknownFormat),

    #[error("engine for format '{format}' has an empty extension")]
    EmptyExtension { format: String },

    #[error("template directory for '{format}.{extension}' does not exist: {}", path.display())]
    MissingTemplateDir {
        format: String,
        extension: String,
        path: PathBuf,
    },

    #[error("invalid transport configuration: {0}")]
    Transport(String),
}

/// The single error a caller of the mailer sees.
///
/// Render, read and transport errors are carried through unchanged so that
/// callers can match on the original failure.
#[derive(Debug, Error)]
pub enum MailerError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A resolution task ended without producing a result (for example the
    /// runtime shut down underneath it).
    #[error("format resolution task did not complete: {0}")]
    TaskFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_display_includes_path() {
        let err = ReadError::new(
            "missing.html",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(err.to_string(), "failed to read missing.html: no such file");
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn retryable_transport_errors() {
        assert!(TransportError::Connection("reset".into()).is_retryable());
        assert!(!TransportError::Rejected("550".into()).is_retryable());
        assert!(!TransportError::InvalidAddress("x".into()).is_retryable());
        assert!(!TransportError::Build("x".into()).is_retryable());
    }

    #[test]
    fn mailer_error_is_transparent() {
        let err: MailerError = RenderError::NotFound("welcome.j2".into()).into();
        assert_eq!(err.to_string(), "template not found: welcome.j2");
        assert!(matches!(err, MailerError::Render(RenderError::NotFound(_))));
    }
}

pub mod backend;
pub mod config;
pub mod hooks;
pub mod message;
pub mod smtp;
pub mod stub;
pub mod transport;

pub use config::{BackendKind, SmtpConfig, TransportConfig};
pub use hooks::{CompileHook, InlineImages};
pub use smtp::SmtpBackend;
pub use stub::StubBackend;
pub use transport::MailTransport;

// Re-export backend trait for external use.
pub use backend::{EmailBackend, EmailResult, InlinePart, OutgoingEmail};

pub mod content;
pub mod error;
pub mod format;
pub mod message;

pub use content::{ContentField, ContentSource, TemplateRef};
pub use error::{ConfigError, MailerError, ReadError, RenderError, TransportError};
pub use format::{Format, UnknownFormat};
pub use message::{Envelope, Message, ResolvedMessage};

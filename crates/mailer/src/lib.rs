//! The mailer: resolves the text and HTML bodies of a message concurrently,
//! then hands the resolved message to the configured transport.
//!
//! A body can be a literal string, a template rendered by a registered
//! engine, or a file read verbatim from disk. See
//! [`FormatResolver`] for how each is handled and [`Mailer`] for the send
//! pipeline as a whole.

pub mod config;
pub mod join;
pub mod mailer;
pub mod resolver;

pub use config::MailerConfig;
pub use join::{TaskCancelled, try_join_keyed};
pub use mailer::{Mailer, SendState};
pub use resolver::{FormatResolver, Resolution};

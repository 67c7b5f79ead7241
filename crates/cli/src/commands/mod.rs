pub mod check_config;
pub mod render;
pub mod send;

use std::path::Path;

use anyhow::Context;
use mailwright_core::Message;
use mailwright_mailer::MailerConfig;

/// Parse a message given inline as JSON or as `@path` to a JSON file.
pub fn parse_message(input: &str) -> anyhow::Result<Message> {
    let raw = if let Some(path) = input.strip_prefix('@') {
        std::fs::read_to_string(path).with_context(|| format!("reading message file {path}"))?
    } else {
        input.to_owned()
    };
    serde_json::from_str(&raw).context("parsing message JSON")
}

pub fn load_config(path: &Path) -> anyhow::Result<MailerConfig> {
    MailerConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

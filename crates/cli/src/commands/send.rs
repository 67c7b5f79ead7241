use std::path::Path;

use clap::Args;
use mailwright_email::TransportConfig;
use mailwright_mailer::Mailer;
use tracing::info;

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Message JSON (string or @file path).
    #[arg(long)]
    pub message: String,
    /// Build the full message with the stub backend and print it instead of
    /// delivering it.
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn run(config_path: &Path, args: &SendArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if args.dry_run {
        info!("dry run, using stub backend");
        config.transport = TransportConfig::stub();
    }
    let mailer = Mailer::from_config(&config)?;
    let message = super::parse_message(&args.message)?;

    let result = mailer.send(message).await?;
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "status": result.status,
                "message_id": result.message_id,
                "response": result.response,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            if args.dry_run {
                println!("{}", result.response.as_deref().unwrap_or_default());
            } else {
                println!(
                    "Email {} (message id: {}).",
                    result.status,
                    result.message_id.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

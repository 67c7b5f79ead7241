use std::path::Path;

use clap::Args;
use mailwright_core::Format;
use mailwright_mailer::Mailer;

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Message JSON (string or @file path).
    #[arg(long)]
    pub message: String,
}

pub async fn run(config_path: &Path, args: &RenderArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let mailer = Mailer::from_config(&config)?;
    let message = super::parse_message(&args.message)?;

    let resolved = mailer.resolve(message).await?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        OutputFormat::Text => {
            for body_format in Format::ALL {
                if let Some(body) = resolved.body(body_format) {
                    println!("--- {body_format} ---");
                    println!("{body}");
                }
            }
        }
    }
    Ok(())
}

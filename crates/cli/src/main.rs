//! mailwright CLI
//!
//! Resolve and send messages described as JSON, using a TOML configuration.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

/// mailwright: render, check and send templated email.
#[derive(Parser, Debug)]
#[command(name = "mailwright", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(
        short,
        long,
        env = "MAILWRIGHT_CONFIG",
        default_value = "mailwright.toml",
        global = true
    )]
    config: PathBuf,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a message and deliver it.
    Send(commands::send::SendArgs),
    /// Resolve a message and print its bodies without sending.
    Render(commands::render::RenderArgs),
    /// Validate the configuration file.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Send(args) => commands::send::run(&cli.config, &args, &cli.format).await,
        Command::Render(args) => commands::render::run(&cli.config, &args, &cli.format).await,
        Command::CheckConfig => commands::check_config::run(&cli.config, &cli.format),
    }
}

use std::path::Path;

use mailwright_core::Format;
use mailwright_views::ViewsConfig;

use crate::OutputFormat;

pub fn run(config_path: &Path, format: &OutputFormat) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    if let Err(e) = config.validate() {
        eprintln!("{}: {e}", config_path.display());
        std::process::exit(1);
    }

    let engines = engine_summary(&config.views)?;
    let backend = serde_json::to_value(config.transport.backend)?;
    let backend = backend.as_str().unwrap_or("unknown");
    match format {
        OutputFormat::Json => {
            let engines: Vec<serde_json::Value> = engines
                .iter()
                .map(|(format, ext, path)| {
                    serde_json::json!({
                        "format": format.as_str(),
                        "extension": ext,
                        "path": path,
                    })
                })
                .collect();
            let value = serde_json::json!({
                "config": config_path.display().to_string(),
                "default_from": config.default_from,
                "backend": backend,
                "inline_styles": config.inline_styles,
                "inline_images": config.inline_images,
                "engines": engines,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("{} is valid.", config_path.display());
            println!("  default sender: {}", config.default_from);
            println!("  backend:        {backend}");
            println!("  inline styles:  {}", config.inline_styles);
            println!("  inline images:  {}", config.inline_images);
            if engines.is_empty() {
                println!("  no template engines registered");
            }
            for (format, ext, path) in &engines {
                println!("  {format}.{ext} -> {path}");
            }
        }
    }
    Ok(())
}

fn engine_summary(views: &ViewsConfig) -> anyhow::Result<Vec<(Format, String, String)>> {
    Ok(views
        .entries()?
        .into_iter()
        .map(|(format, ext, engine)| (format, ext, engine.path.display().to_string()))
        .collect())
}

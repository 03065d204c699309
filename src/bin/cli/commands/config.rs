use std::path::Path;

use anyhow::{bail, Context, Result};

use mew_review::ReviewConfig;

use crate::OutputFormat;

/// Write a config file with the default settings
pub fn run_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    ReviewConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

/// Print the effective config
pub fn run_show(path: &Path, format: &OutputFormat) -> Result<()> {
    let config = ReviewConfig::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": path.display().to_string(),
                "exists": path.exists(),
                "config": config,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if path.exists() {
                println!("# {}", path.display());
            } else {
                println!("# {} (not found, showing defaults)", path.display());
            }
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

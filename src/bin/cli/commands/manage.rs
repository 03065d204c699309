use anyhow::{bail, Context, Result};
use chrono::Utc;

use crate::app::App;
use crate::OutputFormat;

pub fn run_resolve(app: &App, word: &str, format: &OutputFormat) -> Result<()> {
    let Some(entry) = app
        .ledger
        .resolve(&app.user, word, Utc::now())
        .context("Failed to resolve word")?
    else {
        bail!("No mistakes recorded for '{}'", word);
    };
    app.save()?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "wordId": entry.word_id,
                "isResolved": entry.is_resolved,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Marked \"{}\" as mastered.", entry.word_id);
        }
    }

    Ok(())
}

pub fn run_remove(app: &App, word: &str, format: &OutputFormat) -> Result<()> {
    let removed = app
        .ledger
        .remove(&app.user, word)
        .context("Failed to remove word")?;
    if removed.is_none() {
        bail!("No mistakes recorded for '{}'", word);
    }
    app.save()?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "wordId": word, "removed": true });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Removed \"{}\" from the ledger.", word);
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(app: &App, now: DateTime<Utc>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let entries = app
        .ledger
        .entries(&app.user)
        .context("Failed to list ledger entries")?;

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> =
                entries.iter().map(|e| terminal::entry_json(e, now)).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if entries.is_empty() {
                println!("No mistakes recorded for {}.", app.user);
                return Ok(());
            }

            let word_width =
                terminal::column_width(entries.iter().map(|e| e.word_id.as_str()), 4, 30);

            println!(
                "{:<ww$} {:>8} {:>6} {:>8}  {}",
                "Word", "Mistakes", "Streak", "Attempts", "Status",
                ww = word_width
            );
            println!("{}", terminal::rule(&[word_width, 8, 6, 8, 10]));

            for entry in &entries {
                println!(
                    "{:<ww$} {:>8} {:>6} {:>8}  {}",
                    terminal::fit(&entry.word_id, word_width),
                    entry.mistake_count,
                    entry.correct_streak,
                    entry.total_attempts,
                    terminal::status(entry, now, use_color),
                    ww = word_width
                );
            }

            println!("\n{} words total", entries.len());
        }
    }

    Ok(())
}

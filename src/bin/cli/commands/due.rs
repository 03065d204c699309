use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(app: &App, now: DateTime<Utc>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let due = app
        .ledger
        .due_entries(&app.user, now)
        .context("Failed to query due words")?;

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> =
                due.iter().map(|e| terminal::entry_json(e, now)).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if due.is_empty() {
                println!("Nothing due for review.");
                return Ok(());
            }

            let word_width = terminal::column_width(due.iter().map(|e| e.word_id.as_str()), 4, 30);

            println!("{:<ww$} {:>8} {:>6}  {}", "Word", "Mistakes", "Streak", "Due since", ww = word_width);
            println!("{}", terminal::rule(&[word_width, 8, 6, 17]));

            for entry in &due {
                let since = entry.next_review_at.format("%Y-%m-%d %H:%M").to_string();
                println!(
                    "{:<ww$} {:>8} {:>6}  {}",
                    terminal::fit(&entry.word_id, word_width),
                    entry.mistake_count,
                    entry.correct_streak,
                    terminal::paint(&since, terminal::Color::RED, use_color),
                    ww = word_width
                );
            }

            println!("\n{} words due", due.len());
        }
    }

    Ok(())
}

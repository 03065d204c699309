use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    word: &str,
    now: DateTime<Utc>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let Some(entry) = app
        .ledger
        .get(&app.user, word)
        .context("Failed to read ledger")?
    else {
        bail!("No mistakes recorded for '{}'", word);
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&terminal::entry_json(&entry, now))?);
        }
        OutputFormat::Plain => {
            println!("{}", terminal::paint(&entry.word_id, Color::BOLD, use_color));
            println!("  Mistakes:      {}", entry.mistake_count);
            println!("  Correct streak: {}", entry.correct_streak);
            println!("  Attempts:      {}", entry.total_attempts);
            println!("  Error rate:    {:.0}%", entry.error_rate() * 100.0);
            println!("  Last mistake:  {}", entry.last_mistake_at.format("%Y-%m-%d %H:%M"));
            println!("  Last attempt:  {}", entry.last_event_at.format("%Y-%m-%d %H:%M"));
            println!(
                "  Next review:   {} ({})",
                entry.next_review_at.format("%Y-%m-%d %H:%M"),
                terminal::status(&entry, now, use_color)
            );
        }
    }

    Ok(())
}

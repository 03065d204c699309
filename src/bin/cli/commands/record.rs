use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use mew_review::Attempt;

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(
    app: &App,
    word: &str,
    correct: bool,
    at: DateTime<Utc>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let attempt = Attempt::new(app.user.as_str(), word, correct, at);
    let updated = app
        .ledger
        .record_attempt(&attempt)
        .with_context(|| format!("Failed to record attempt on '{}'", word))?;

    if updated.is_some() {
        app.save()?;
    }

    match format {
        OutputFormat::Json => {
            let output = match &updated {
                Some(entry) => terminal::entry_json(entry, at),
                None => serde_json::json!({
                    "wordId": word,
                    "userId": app.user,
                    "tracked": false,
                }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => match &updated {
            Some(entry) => {
                let outcome = if correct {
                    terminal::paint("correct", Color::GREEN, use_color)
                } else {
                    terminal::paint("incorrect", Color::RED, use_color)
                };
                println!("Recorded {} attempt on \"{}\"", outcome, entry.word_id);
                println!(
                    "  Mistakes: {}  Streak: {}  Attempts: {}",
                    entry.mistake_count, entry.correct_streak, entry.total_attempts
                );
                println!(
                    "  Next review: {} ({})",
                    entry.next_review_at.format("%Y-%m-%d %H:%M"),
                    terminal::due_label(entry, at)
                );
                if entry.is_resolved {
                    println!("  Word is resolved.");
                }
            }
            None => {
                println!("\"{}\" has no mistakes on record; nothing to schedule.", word);
            }
        },
    }

    Ok(())
}

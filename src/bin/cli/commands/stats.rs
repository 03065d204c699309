use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use mew_review::review::scheduler::format_interval;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, now: DateTime<Utc>, format: &OutputFormat) -> Result<()> {
    let stats = app
        .ledger
        .stats(&app.user, now)
        .context("Failed to compute ledger statistics")?;

    match format {
        OutputFormat::Json => {
            let mut output = serde_json::to_value(&stats)?;
            output["userId"] = serde_json::json!(app.user);
            output["errorRate"] = serde_json::json!(stats.error_rate());
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Ledger for {}", app.user);
            println!("  Words tracked: {}", stats.total_entries);
            println!("  Due now:       {}", stats.due_entries);
            println!("  Resolved:      {}", stats.resolved_entries);
            println!("  Mistakes:      {}", stats.total_mistakes);
            println!("  Attempts:      {}", stats.total_attempts);
            println!("  Error rate:    {:.0}%", stats.error_rate() * 100.0);
        }
    }

    Ok(())
}

pub fn run_intervals(app: &App, format: &OutputFormat) -> Result<()> {
    let scheduler = app.ledger.scheduler();
    let table = scheduler.table();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "intervalsMinutes": app.config.intervals_minutes,
                "autoResolveStreak": scheduler.auto_resolve_streak(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Level  Interval  Used after");
            for (level, interval) in table.steps().iter().enumerate() {
                let used_after = if level == 0 {
                    "a mistake".to_string()
                } else if level == table.max_level() {
                    format!("{}+ correct in a row", level)
                } else {
                    format!("{} correct in a row", level)
                };
                println!("{:>5}  {:>8}  {}", level, format_interval(*interval), used_after);
            }
            if let Some(streak) = scheduler.auto_resolve_streak() {
                println!("\nWords resolve after {} correct in a row.", streak);
            }
        }
    }

    Ok(())
}

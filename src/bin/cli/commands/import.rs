use anyhow::{Context, Result};

use mew_review::{SessionRecorder, SessionState};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, content: &str, format: &OutputFormat) -> Result<()> {
    let state: SessionState =
        serde_json::from_str(content).context("Failed to parse session JSON")?;
    let summary = state.summary();

    let report = SessionRecorder::new(&app.ledger)
        .record(&app.user, &state)
        .context("Failed to record session")?;
    app.save()?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "summary": summary,
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if let Some(summary) = &summary {
                println!(
                    "Session: {}/{} correct ({:.0}%, {:?})",
                    summary.correct_words,
                    summary.total_words,
                    summary.accuracy * 100.0,
                    summary.grade
                );
            }
            println!("  Scheduled: {}", report.updated.len());
            println!("  Untracked: {}", report.untracked.len());
            for (word, reason) in &report.failed {
                println!("  Failed {}: {}", word, reason);
            }
        }
    }

    Ok(())
}

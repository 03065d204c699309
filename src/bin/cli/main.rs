mod app;
mod commands;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgGroup, Parser, Subcommand};

use mew_review::ReviewConfig;

#[derive(Parser)]
#[command(name = "mew-review", about = "Dictation mistake ledger and review scheduler", version)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Learner id (default: from config)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Record one dictation attempt
    #[command(group(ArgGroup::new("outcome").required(true).args(["correct", "incorrect"])))]
    Record {
        /// Word id
        word: String,
        /// The word was written correctly
        #[arg(long)]
        correct: bool,
        /// The word was written incorrectly
        #[arg(long)]
        incorrect: bool,
        /// Attempt time (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
    },

    /// List words due for review, earliest first
    Due {
        /// Query time (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
    },

    /// List all ledger entries in creation order
    List,

    /// Show one word's ledger entry
    Show {
        /// Word id
        word: String,
    },

    /// Mark a word as mastered
    Resolve {
        /// Word id
        word: String,
    },

    /// Delete a word from the ledger
    Remove {
        /// Word id
        word: String,
    },

    /// Ledger statistics
    Stats {
        /// Query time (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Show the review interval ladder
    Intervals,

    /// Record a completed session exported as JSON (use "-" for stdin)
    Import {
        /// Session file
        file: String,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config file with the default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config
    Show,
}

/// Parse an optional RFC 3339 timestamp, defaulting to now
fn resolve_time(at: Option<&str>) -> Result<DateTime<Utc>> {
    match at {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("Invalid timestamp '{}', expected RFC 3339", s))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

/// Read a file, or stdin for "-"
fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();

    if let Command::Config { action } = &cli.command {
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => ReviewConfig::default_path()
                .context("Could not determine the config directory")?,
        };
        return match action {
            ConfigAction::Init { force } => commands::config::run_init(&path, *force),
            ConfigAction::Show => commands::config::run_show(&path, &cli.format),
        };
    }

    let app = app::App::new(cli.config.as_deref(), cli.user.as_deref())?;

    match cli.command {
        Command::Record {
            word,
            correct,
            incorrect: _,
            at,
        } => {
            let at = resolve_time(at.as_deref())?;
            commands::record::run(&app, &word, correct, at, &cli.format, use_color)?;
        }
        Command::Due { at } => {
            let at = resolve_time(at.as_deref())?;
            commands::due::run(&app, at, &cli.format, use_color)?;
        }
        Command::List => {
            commands::list::run(&app, Utc::now(), &cli.format, use_color)?;
        }
        Command::Show { word } => {
            commands::show::run(&app, &word, Utc::now(), &cli.format, use_color)?;
        }
        Command::Resolve { word } => {
            commands::manage::run_resolve(&app, &word, &cli.format)?;
        }
        Command::Remove { word } => {
            commands::manage::run_remove(&app, &word, &cli.format)?;
        }
        Command::Stats { at } => {
            let at = resolve_time(at.as_deref())?;
            commands::stats::run(&app, at, &cli.format)?;
        }
        Command::Intervals => {
            commands::stats::run_intervals(&app, &cli.format)?;
        }
        Command::Import { file } => {
            let content = read_input(&file)?;
            commands::import::run(&app, &content, &cli.format)?;
        }
        Command::Config { .. } => unreachable!("handled before loading the ledger"),
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}

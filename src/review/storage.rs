//! Storage operations for the mistake ledger
//!
//! Directory structure:
//! ```text
//! {data-dir}/ledger/
//! ├── {user-id}.json   # Array of the user's entries, in creation order
//! └── {user-id}.json.corrupt-{timestamp}   # Set aside when loading failed
//! ```

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;

use super::ledger::{LedgerError, MistakeLedger};
use super::models::MistakeEntry;
use super::scheduler::Scheduler;

#[derive(Error, Debug)]
pub enum LedgerStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Invalid user id: {0:?}")]
    InvalidUserId(String),

    #[error("Could not determine the local data directory")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, LedgerStorageError>;

/// JSON file persistence for ledger snapshots
pub struct LedgerStorage {
    /// Base path for ledger files (e.g., ~/.local/share/mew-review/ledger)
    ledger_dir: PathBuf,
}

impl LedgerStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            ledger_dir: data_dir.join("ledger"),
        }
    }

    /// Default data directory for the application
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("mew-review"))
            .ok_or(LedgerStorageError::DataDirNotFound)
    }

    /// Initialize storage directories
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.ledger_dir)?;
        Ok(())
    }

    fn is_valid_user_id(user_id: &str) -> bool {
        !user_id.trim().is_empty()
            && !user_id.starts_with('.')
            && !user_id.contains(['/', '\\', ':'])
    }

    /// Get the ledger file for a user
    fn user_path(&self, user_id: &str) -> Result<PathBuf> {
        if !Self::is_valid_user_id(user_id) {
            return Err(LedgerStorageError::InvalidUserId(user_id.to_string()));
        }
        Ok(self.ledger_dir.join(format!("{}.json", user_id)))
    }

    /// Set a user's file aside under a timestamped `.corrupt` name.
    ///
    /// With `move_file` the original is renamed away, otherwise it is copied
    /// and left in place.
    fn quarantine(&self, user_id: &str, move_file: bool) -> Result<PathBuf> {
        let path = self.user_path(user_id)?;
        let backup = self.ledger_dir.join(format!(
            "{}.json.corrupt-{}",
            user_id,
            Utc::now().format("%Y%m%dT%H%M%S%.3f")
        ));

        if move_file {
            fs::rename(&path, &backup)?;
        } else {
            fs::copy(&path, &backup)?;
        }
        Ok(backup)
    }

    /// List users that have a stored ledger
    pub fn list_users(&self) -> Result<Vec<String>> {
        if !self.ledger_dir.exists() {
            return Ok(Vec::new());
        }

        let mut users = Vec::new();
        for entry in fs::read_dir(&self.ledger_dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                match path.file_stem().and_then(|s| s.to_str()) {
                    Some(stem) if Self::is_valid_user_id(stem) => users.push(stem.to_string()),
                    _ => log::warn!("Ignoring ledger file with an invalid name: {:?}", path),
                }
            }
        }

        users.sort();
        Ok(users)
    }

    /// Load a user's entries. A user without a file has no entries.
    pub fn load_user(&self, user_id: &str) -> Result<Vec<MistakeEntry>> {
        let path = self.user_path(user_id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        let entries: Vec<MistakeEntry> = serde_json::from_str(&content)?;
        Ok(entries)
    }

    /// Replace a user's stored entries
    pub fn save_user(&self, user_id: &str, entries: &[MistakeEntry]) -> Result<()> {
        self.init()?;
        let path = self.user_path(user_id)?;

        // Write to a sibling temp file, then rename into place
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&tmp, &path)?;

        log::info!("Saved {} ledger entries for {}", entries.len(), user_id);
        Ok(())
    }

    /// Build a ledger from every stored user file.
    ///
    /// A file that cannot be parsed is moved aside and that user starts
    /// empty. Entries that fail validation, or belong to another user, are
    /// skipped one by one after the file is backed up. Other users load
    /// normally in both cases.
    pub fn load_ledger(&self, scheduler: Scheduler) -> Result<MistakeLedger> {
        let ledger = MistakeLedger::new(scheduler);

        for user in self.list_users()? {
            let entries = match self.load_user(&user) {
                Ok(entries) => entries,
                Err(e) => {
                    let backup = self.quarantine(&user, true)?;
                    log::warn!(
                        "Unreadable ledger for {} moved to {:?}: {}",
                        user,
                        backup,
                        e
                    );
                    continue;
                }
            };

            let (own, foreign): (Vec<_>, Vec<_>) =
                entries.into_iter().partition(|e| e.user_id == user);
            for entry in &foreign {
                log::warn!(
                    "Skipping entry {} of user {} found in the ledger of {}",
                    entry.id,
                    entry.user_id,
                    user
                );
            }

            let rejected = ledger.restore(own)?;
            if !rejected.is_empty() || !foreign.is_empty() {
                let backup = self.quarantine(&user, false)?;
                log::warn!(
                    "Skipped {} entries for {}; original file kept at {:?}",
                    rejected.len() + foreign.len(),
                    user,
                    backup
                );
            }
        }

        Ok(ledger)
    }

    /// Persist every user in the ledger.
    ///
    /// Users whose last entry was removed keep an empty file so the removal
    /// survives a reload.
    pub fn save_ledger(&self, ledger: &MistakeLedger) -> Result<()> {
        let mut users = ledger.users()?;
        for stored in self.list_users()? {
            if !users.contains(&stored) {
                users.push(stored);
            }
        }

        for user in users {
            let entries = ledger.entries(&user)?;
            self.save_user(&user, &entries)?;
        }
        Ok(())
    }
}

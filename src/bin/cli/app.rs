use std::path::Path;

use anyhow::{Context, Result};

use mew_review::{LedgerStorage, MistakeLedger, ReviewConfig};

/// Shared application state for CLI commands
pub struct App {
    pub config: ReviewConfig,
    pub storage: LedgerStorage,
    pub ledger: MistakeLedger,
    /// Learner the commands act on
    pub user: String,
}

impl App {
    /// Load config and the stored ledger
    pub fn new(config_path: Option<&Path>, user: Option<&str>) -> Result<Self> {
        let config = match config_path {
            Some(path) => ReviewConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => match ReviewConfig::default_path() {
                Some(path) => ReviewConfig::load(&path).context("Failed to load config")?,
                None => ReviewConfig::default(),
            },
        };

        let data_dir = match &config.data_dir {
            Some(dir) => dir.clone(),
            None => LedgerStorage::default_data_dir().context("Failed to get data directory")?,
        };

        let storage = LedgerStorage::new(data_dir);
        storage.init().context("Failed to initialize ledger storage")?;

        let scheduler = config.scheduler().context("Invalid review configuration")?;
        let ledger = storage
            .load_ledger(scheduler)
            .context("Failed to load mistake ledger")?;

        let user = user.unwrap_or(config.default_user.as_str()).to_string();

        Ok(Self {
            config,
            storage,
            ledger,
            user,
        })
    }

    /// Persist the current learner's entries
    pub fn save(&self) -> Result<()> {
        let entries = self
            .ledger
            .entries(&self.user)
            .context("Failed to read ledger")?;
        self.storage
            .save_user(&self.user, &entries)
            .context("Failed to save mistake ledger")
    }
}

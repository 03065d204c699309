//! In-memory mistake ledger
//!
//! The ledger owns every `MistakeEntry` and is the only place entries are
//! mutated. Each (user, word) key has its own mutex so attempts on the
//! same word are applied one at a time, while attempts on different words
//! only share a short read of the key map. Queries clone entries out and
//! never touch due times.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use thiserror::Error;

use super::models::{Attempt, LedgerKey, LedgerStats, MistakeEntry};
use super::scheduler::{get_due_entries, validate_entry, Scheduler, SchedulerError};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("Duplicate ledger entry for word '{word_id}' of user '{user_id}'")]
    DuplicateEntry { user_id: String, word_id: String },

    #[error("Ledger lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// A key's current entry; `None` once removed or before the first mistake lands
type Slot = Arc<Mutex<Option<MistakeEntry>>>;

/// Ledger store keyed by (user, word), kept in creation order
pub struct MistakeLedger {
    scheduler: Scheduler,
    slots: RwLock<IndexMap<LedgerKey, Slot>>,
}

impl MistakeLedger {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            slots: RwLock::new(IndexMap::new()),
        }
    }

    /// Rebuild a ledger from persisted entries (in creation order).
    /// Any invalid or duplicate entry fails the whole call; use
    /// [`MistakeLedger::restore`] to skip bad entries instead.
    pub fn from_entries(scheduler: Scheduler, entries: Vec<MistakeEntry>) -> Result<Self> {
        let mut slots = IndexMap::with_capacity(entries.len());
        for entry in entries {
            validate_entry(&entry)?;
            let key = entry.key();
            if slots.contains_key(&key) {
                return Err(LedgerError::DuplicateEntry {
                    user_id: key.user_id,
                    word_id: key.word_id,
                });
            }
            slots.insert(key, Arc::new(Mutex::new(Some(entry))));
        }

        Ok(Self {
            scheduler,
            slots: RwLock::new(slots),
        })
    }

    /// Add persisted entries one by one, skipping any that are invalid or
    /// already present. Returns the skipped entries with the reason.
    pub fn restore(&self, entries: Vec<MistakeEntry>) -> Result<Vec<(MistakeEntry, LedgerError)>> {
        let mut slots = self.write_slots()?;
        let mut rejected = Vec::new();

        for entry in entries {
            if let Err(e) = validate_entry(&entry) {
                log::warn!("Skipping invalid ledger entry {}: {}", entry.id, e);
                rejected.push((entry, e.into()));
                continue;
            }

            let key = entry.key();
            if slots.contains_key(&key) {
                log::warn!(
                    "Skipping duplicate ledger entry for {} of {}",
                    key.word_id,
                    key.user_id
                );
                rejected.push((
                    entry,
                    LedgerError::DuplicateEntry {
                        user_id: key.user_id,
                        word_id: key.word_id,
                    },
                ));
                continue;
            }

            slots.insert(key, Arc::new(Mutex::new(Some(entry))));
        }

        Ok(rejected)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    fn read_slots(&self) -> Result<RwLockReadGuard<'_, IndexMap<LedgerKey, Slot>>> {
        self.slots.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write_slots(&self) -> Result<RwLockWriteGuard<'_, IndexMap<LedgerKey, Slot>>> {
        self.slots.write().map_err(|_| LedgerError::LockPoisoned)
    }

    fn lock(slot: &Slot) -> Result<MutexGuard<'_, Option<MistakeEntry>>> {
        slot.lock().map_err(|_| LedgerError::LockPoisoned)
    }

    fn existing_slot(&self, key: &LedgerKey) -> Result<Option<Slot>> {
        Ok(self.read_slots()?.get(key).cloned())
    }

    /// Whether `slot` is still the one the map holds for `key`
    fn is_current(&self, key: &LedgerKey, slot: &Slot) -> Result<bool> {
        Ok(self
            .read_slots()?
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot)))
    }

    /// Drop a key whose slot never received an entry
    fn discard_empty(&self, key: &LedgerKey, slot: &Slot) -> Result<()> {
        let mut slots = self.write_slots()?;
        if slots.get(key).is_some_and(|current| Arc::ptr_eq(current, slot)) {
            slots.shift_remove(key);
        }
        Ok(())
    }

    // ==================== Updates ====================

    /// Apply one attempt to the ledger.
    ///
    /// Returns the updated entry, or `None` when a correct answer was given
    /// for a word that has no entry. A failed update leaves the stored entry
    /// untouched.
    pub fn record_attempt(&self, attempt: &Attempt) -> Result<Option<MistakeEntry>> {
        let key = attempt.key();

        loop {
            let slot = match self.existing_slot(&key)? {
                Some(slot) => slot,
                None if attempt.is_correct => return Ok(None),
                None => {
                    let mut slots = self.write_slots()?;
                    slots
                        .entry(key.clone())
                        .or_insert_with(|| Arc::new(Mutex::new(None)))
                        .clone()
                }
            };

            let mut guard = Self::lock(&slot)?;

            // A concurrent remove detached this slot; start over on the live one
            if !self.is_current(&key, &slot)? {
                continue;
            }

            return match self.scheduler.update_after_attempt(guard.as_ref(), attempt) {
                Ok(updated) => {
                    if let Some(entry) = &updated {
                        *guard = Some(entry.clone());
                    }
                    Ok(updated)
                }
                Err(e) => {
                    if guard.is_none() {
                        self.discard_empty(&key, &slot)?;
                    }
                    Err(e.into())
                }
            };
        }
    }

    /// Apply attempts in order. Each attempt stands alone: a failure is
    /// reported in its position and the rest still run.
    pub fn record_attempts(&self, attempts: &[Attempt]) -> Vec<Result<Option<MistakeEntry>>> {
        attempts
            .iter()
            .map(|attempt| {
                let result = self.record_attempt(attempt);
                if let Err(e) = &result {
                    log::warn!(
                        "Failed to record attempt on {} for {}: {}",
                        attempt.word_id,
                        attempt.user_id,
                        e
                    );
                }
                result
            })
            .collect()
    }

    /// Mark a word as mastered. Returns `None` if it has no entry.
    pub fn resolve(
        &self,
        user_id: &str,
        word_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<MistakeEntry>> {
        let Some(slot) = self.existing_slot(&LedgerKey::new(user_id, word_id))? else {
            return Ok(None);
        };

        let mut guard = Self::lock(&slot)?;
        Ok(guard.as_mut().map(|entry| {
            if !entry.is_resolved {
                entry.is_resolved = true;
                entry.updated_at = now;
                log::info!("Marked word {} as mastered for {}", word_id, user_id);
            }
            entry.clone()
        }))
    }

    /// Delete an entry outright. Returns the removed entry, if any.
    pub fn remove(&self, user_id: &str, word_id: &str) -> Result<Option<MistakeEntry>> {
        let slot = self
            .write_slots()?
            .shift_remove(&LedgerKey::new(user_id, word_id));

        match slot {
            Some(slot) => {
                let removed = Self::lock(&slot)?.take();
                if removed.is_some() {
                    log::info!("Removed word {} from the ledger of {}", word_id, user_id);
                }
                Ok(removed)
            }
            None => Ok(None),
        }
    }

    // ==================== Queries ====================

    /// Look up one entry. A word that was never mistaken has no entry.
    pub fn get(&self, user_id: &str, word_id: &str) -> Result<Option<MistakeEntry>> {
        match self.existing_slot(&LedgerKey::new(user_id, word_id))? {
            Some(slot) => Ok(Self::lock(&slot)?.clone()),
            None => Ok(None),
        }
    }

    /// All entries, across users, in creation order
    pub fn snapshot(&self) -> Result<Vec<MistakeEntry>> {
        self.collect(|_| true)
    }

    /// One learner's entries in creation order
    pub fn entries(&self, user_id: &str) -> Result<Vec<MistakeEntry>> {
        self.collect(|key| key.user_id == user_id)
    }

    fn collect(&self, filter: impl Fn(&LedgerKey) -> bool) -> Result<Vec<MistakeEntry>> {
        let slots: Vec<Slot> = self
            .read_slots()?
            .iter()
            .filter(|(key, _)| filter(key))
            .map(|(_, slot)| slot.clone())
            .collect();

        let mut out = Vec::with_capacity(slots.len());
        for slot in &slots {
            if let Some(entry) = Self::lock(slot)?.as_ref() {
                out.push(entry.clone());
            }
        }
        Ok(out)
    }

    /// Learners that have at least one entry, in first-seen order
    pub fn users(&self) -> Result<Vec<String>> {
        let mut users: Vec<String> = Vec::new();
        for entry in self.snapshot()? {
            if !users.contains(&entry.user_id) {
                users.push(entry.user_id);
            }
        }
        Ok(users)
    }

    /// Entries due for a learner at `now`, earliest first
    pub fn due_entries(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<MistakeEntry>> {
        let entries = self.entries(user_id)?;
        Ok(get_due_entries(&entries, now))
    }

    /// Word ids to put into the next review session, earliest due first
    pub fn due_words(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<String>> {
        Ok(self
            .due_entries(user_id, now)?
            .into_iter()
            .map(|e| e.word_id)
            .collect())
    }

    pub fn stats(&self, user_id: &str, now: DateTime<Utc>) -> Result<LedgerStats> {
        let entries = self.entries(user_id)?;
        let mut stats = LedgerStats {
            total_entries: entries.len(),
            ..Default::default()
        };

        for entry in &entries {
            if entry.is_resolved {
                stats.resolved_entries += 1;
            }
            if entry.is_due(now) {
                stats.due_entries += 1;
            }
            stats.total_mistakes += entry.mistake_count as u64;
            stats.total_attempts += entry.total_attempts as u64;
        }

        Ok(stats)
    }
}

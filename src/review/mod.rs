//! Mistake ledger and spaced review scheduling
//!
//! This module provides:
//! - The Ebbinghaus interval ladder
//! - Per-(user, word) mistake entries and their invariants
//! - The scheduler that turns attempt outcomes into next-review times
//! - Due-set queries and the ledger store that owns all entries
//! - JSON persistence of ledger snapshots

pub mod intervals;
pub mod ledger;
pub mod models;
pub mod scheduler;
pub mod storage;

pub use intervals::IntervalTable;
pub use ledger::{LedgerError, MistakeLedger};
pub use models::*;
pub use scheduler::{get_due_entries, Scheduler, SchedulerError};
pub use storage::{LedgerStorage, LedgerStorageError};

//! Mistake tracking and spaced review for dictation practice.
//!
//! Words a learner gets wrong enter the mistake ledger. Each later attempt
//! moves the word along an Ebbinghaus interval ladder, and the due-set
//! query picks what to dictate next.

pub mod config;
pub mod review;
pub mod session;

pub use config::{ConfigError, ReviewConfig};
pub use review::{
    get_due_entries, Attempt, IntervalTable, LedgerKey, LedgerStats, LedgerStorage,
    MistakeEntry, MistakeLedger, Scheduler, SchedulerError,
};
pub use session::{transition, SessionError, SessionEvent, SessionRecorder, SessionState};

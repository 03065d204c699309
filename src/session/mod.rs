//! Dictation session flow
//!
//! A session moves through Idle, Ready, InProgress and Completed (or Error)
//! via a single transition function. Completed sessions are handed to the
//! recorder, which reports each word's outcome to the mistake ledger.

pub mod machine;
pub mod models;
pub mod recorder;

pub use machine::{transition, SessionError};
pub use models::*;
pub use recorder::{RecordReport, SessionRecorder};

//! Feeds completed sessions into the mistake ledger

use serde::Serialize;

use super::machine::{Result, SessionError};
use super::models::SessionState;
use crate::review::{Attempt, MistakeEntry, MistakeLedger};

/// What happened to each word when a session was recorded
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordReport {
    /// Entries created or updated, in dictation order
    pub updated: Vec<MistakeEntry>,
    /// Correct answers for words that were never mistaken
    pub untracked: Vec<String>,
    /// Words whose update was rejected, with the reason
    pub failed: Vec<(String, String)>,
}

/// Reports per-word outcomes of finished sessions to the ledger
pub struct SessionRecorder<'a> {
    ledger: &'a MistakeLedger,
}

impl<'a> SessionRecorder<'a> {
    pub fn new(ledger: &'a MistakeLedger) -> Self {
        Self { ledger }
    }

    /// Turn a completed session into attempts, stamped with the completion time
    pub fn attempts(user_id: &str, state: &SessionState) -> Result<Vec<Attempt>> {
        match state {
            SessionState::Completed {
                results,
                completed_at,
                ..
            } => Ok(results
                .iter()
                .map(|r| Attempt::new(user_id, r.word_id.clone(), r.is_correct, *completed_at))
                .collect()),
            other => Err(SessionError::NotCompleted(other.name())),
        }
    }

    /// Record every word of a completed session, in dictation order.
    ///
    /// One rejected update does not stop the others; persistence of the
    /// updated ledger is left to the caller.
    pub fn record(&self, user_id: &str, state: &SessionState) -> Result<RecordReport> {
        let attempts = Self::attempts(user_id, state)?;
        let results = self.ledger.record_attempts(&attempts);

        let mut report = RecordReport::default();
        for (attempt, result) in attempts.into_iter().zip(results) {
            match result {
                Ok(Some(entry)) => report.updated.push(entry),
                Ok(None) => report.untracked.push(attempt.word_id),
                Err(e) => report.failed.push((attempt.word_id, e.to_string())),
            }
        }

        log::info!(
            "Recorded session for {}: {} updated, {} untracked, {} failed",
            user_id,
            report.updated.len(),
            report.untracked.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

//! Data models for the mistake ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a ledger entry: one learner, one vocabulary item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerKey {
    pub user_id: String,
    pub word_id: String,
}

impl LedgerKey {
    pub fn new(user_id: impl Into<String>, word_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            word_id: word_id.into(),
        }
    }
}

/// Per-(user, word) mistake history and review schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeEntry {
    pub id: Uuid,
    pub user_id: String,
    pub word_id: String,
    /// Lifetime count of incorrect attempts
    pub mistake_count: u32,
    /// Consecutive correct attempts since the last mistake
    #[serde(default)]
    pub correct_streak: u32,
    /// All recorded attempts, correct or not
    pub total_attempts: u32,
    pub last_mistake_at: DateTime<Utc>,
    /// Most recent recorded attempt; the due time is derived from it
    pub last_event_at: DateTime<Utc>,
    /// The entry is due once `now >= next_review_at`
    pub next_review_at: DateTime<Utc>,
    #[serde(default)]
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MistakeEntry {
    /// Fresh entry for a first mistake. Counters start at zero; the
    /// scheduler applies the mistake itself.
    pub(crate) fn blank(user_id: &str, word_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            word_id: word_id.to_string(),
            mistake_count: 0,
            correct_streak: 0,
            total_attempts: 0,
            last_mistake_at: now,
            last_event_at: now,
            next_review_at: now,
            is_resolved: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> LedgerKey {
        LedgerKey::new(self.user_id.clone(), self.word_id.clone())
    }

    /// Check if the entry needs review at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.is_resolved && now >= self.next_review_at
    }

    /// Share of attempts that were mistakes
    pub fn error_rate(&self) -> f32 {
        if self.total_attempts > 0 {
            self.mistake_count as f32 / self.total_attempts as f32
        } else {
            0.0
        }
    }
}

/// One judged dictation attempt, as reported by the session flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub word_id: String,
    pub user_id: String,
    pub is_correct: bool,
    pub at: DateTime<Utc>,
}

impl Attempt {
    pub fn new(
        user_id: impl Into<String>,
        word_id: impl Into<String>,
        is_correct: bool,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            word_id: word_id.into(),
            user_id: user_id.into(),
            is_correct,
            at,
        }
    }

    pub fn key(&self) -> LedgerKey {
        LedgerKey::new(self.user_id.clone(), self.word_id.clone())
    }
}

/// Ledger statistics for one learner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStats {
    pub total_entries: usize,
    pub due_entries: usize,
    pub resolved_entries: usize,
    pub total_mistakes: u64,
    pub total_attempts: u64,
}

impl LedgerStats {
    pub fn error_rate(&self) -> f32 {
        if self.total_attempts > 0 {
            self.total_mistakes as f32 / self.total_attempts as f32
        } else {
            0.0
        }
    }
}

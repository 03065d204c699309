//! Data models for dictation sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A vocabulary item as handed over by the content lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub text: String,
    /// Language tag for playback (e.g., "en", "zh")
    #[serde(default)]
    pub language: String,
}

impl Word {
    pub fn new(id: impl Into<String>, text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            language: language.into(),
        }
    }

    /// Judge a learner's input against this word
    pub fn matches(&self, input: &str) -> bool {
        input.trim().to_lowercase() == self.text.trim().to_lowercase()
    }
}

/// Where the session's words came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRef {
    pub id: String,
    pub name: String,
}

/// Outcome for one dictated word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordResult {
    pub word_id: String,
    /// `None` if the word was skipped or never reached
    pub input: Option<String>,
    pub is_correct: bool,
}

/// Dictation session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SessionState {
    /// Nothing selected yet
    Idle,
    /// Words chosen, dictation not started
    Ready {
        words: Vec<Word>,
        lesson: Option<LessonRef>,
    },
    /// Dictating; `inputs[i]` is the answer for `words[i]`
    #[serde(rename_all = "camelCase")]
    InProgress {
        words: Vec<Word>,
        inputs: Vec<Option<String>>,
        started_at: DateTime<Utc>,
        lesson: Option<LessonRef>,
    },
    /// All answers judged
    #[serde(rename_all = "camelCase")]
    Completed {
        words: Vec<Word>,
        results: Vec<WordResult>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        lesson: Option<LessonRef>,
    },
    Error {
        message: String,
    },
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Ready { .. } => "ready",
            Self::InProgress { .. } => "inProgress",
            Self::Completed { .. } => "completed",
            Self::Error { .. } => "error",
        }
    }

    /// The word to dictate next, if a session is running
    pub fn current_word(&self) -> Option<&Word> {
        match self {
            Self::InProgress { words, inputs, .. } => words.get(inputs.len()),
            _ => None,
        }
    }

    /// Summary of a completed session
    pub fn summary(&self) -> Option<SessionSummary> {
        match self {
            Self::Completed {
                results,
                started_at,
                completed_at,
                ..
            } => Some(SessionSummary::new(results, *started_at, *completed_at)),
            _ => None,
        }
    }
}

/// Events that drive a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Load {
        words: Vec<Word>,
        lesson: Option<LessonRef>,
    },
    Start {
        at: DateTime<Utc>,
    },
    Submit {
        input: String,
    },
    Skip,
    Finish {
        at: DateTime<Utc>,
    },
    Fail {
        message: String,
    },
    Reset,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::Start { .. } => "start",
            Self::Submit { .. } => "submit",
            Self::Skip => "skip",
            Self::Finish { .. } => "finish",
            Self::Fail { .. } => "fail",
            Self::Reset => "reset",
        }
    }
}

/// Grade band for a session's accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GradeBand {
    /// 95% or better
    Excellent,
    /// 85% or better
    Good,
    /// 70% or better
    Pass,
    NeedsWork,
}

impl GradeBand {
    pub fn from_accuracy(accuracy: f32) -> Self {
        if accuracy >= 0.95 {
            Self::Excellent
        } else if accuracy >= 0.85 {
            Self::Good
        } else if accuracy >= 0.70 {
            Self::Pass
        } else {
            Self::NeedsWork
        }
    }
}

/// Report for a completed session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub total_words: usize,
    pub correct_words: usize,
    /// 0.0 to 1.0
    pub accuracy: f32,
    pub elapsed_ms: i64,
    pub average_ms_per_word: i64,
    pub grade: GradeBand,
    pub missed_word_ids: Vec<String>,
}

impl SessionSummary {
    pub fn new(results: &[WordResult], started_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> Self {
        let total_words = results.len();
        let correct_words = results.iter().filter(|r| r.is_correct).count();
        let accuracy = if total_words > 0 {
            correct_words as f32 / total_words as f32
        } else {
            0.0
        };
        let elapsed_ms = (completed_at - started_at).num_milliseconds().max(0);
        let average_ms_per_word = if total_words > 0 {
            elapsed_ms / total_words as i64
        } else {
            0
        };

        Self {
            total_words,
            correct_words,
            accuracy,
            elapsed_ms,
            average_ms_per_word,
            grade: GradeBand::from_accuracy(accuracy),
            missed_word_ids: results
                .iter()
                .filter(|r| !r.is_correct)
                .map(|r| r.word_id.clone())
                .collect(),
        }
    }

    pub fn incorrect_words(&self) -> usize {
        self.total_words - self.correct_words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_word_matching_ignores_case_and_spaces() {
        let word = Word::new("w1", "Apple", "en");
        assert!(word.matches("  apple "));
        assert!(word.matches("APPLE"));
        assert!(!word.matches("appel"));

        let hanzi = Word::new("w2", "苹果", "zh");
        assert!(hanzi.matches("苹果"));
        assert!(!hanzi.matches("平果"));
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(GradeBand::from_accuracy(1.0), GradeBand::Excellent);
        assert_eq!(GradeBand::from_accuracy(0.95), GradeBand::Excellent);
        assert_eq!(GradeBand::from_accuracy(0.9), GradeBand::Good);
        assert_eq!(GradeBand::from_accuracy(0.7), GradeBand::Pass);
        assert_eq!(GradeBand::from_accuracy(0.5), GradeBand::NeedsWork);
    }

    #[test]
    fn test_summary_counts() {
        let start = Utc::now();
        let results = vec![
            WordResult { word_id: "a".into(), input: Some("a".into()), is_correct: true },
            WordResult { word_id: "b".into(), input: None, is_correct: false },
            WordResult { word_id: "c".into(), input: Some("c".into()), is_correct: true },
            WordResult { word_id: "d".into(), input: Some("x".into()), is_correct: false },
        ];

        let summary = SessionSummary::new(&results, start, start + Duration::seconds(40));
        assert_eq!(summary.total_words, 4);
        assert_eq!(summary.correct_words, 2);
        assert_eq!(summary.incorrect_words(), 2);
        assert_eq!(summary.accuracy, 0.5);
        assert_eq!(summary.elapsed_ms, 40_000);
        assert_eq!(summary.average_ms_per_word, 10_000);
        assert_eq!(summary.grade, GradeBand::NeedsWork);
        assert_eq!(summary.missed_word_ids, vec!["b", "d"]);
    }
}

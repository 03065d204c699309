//! Session state transitions
//!
//! ```text
//! Idle/Completed/Error --load--> Ready --start--> InProgress --finish--> Completed
//!                                                  |  ^
//!                                                  submit/skip
//! any --fail--> Error        any --reset--> Idle
//! ```

use thiserror::Error;

use super::models::{SessionEvent, SessionState, WordResult};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot {event} a session that is {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },

    #[error("Cannot load a session without words")]
    EmptyWordList,

    #[error("Every word has already been answered")]
    NoCurrentWord,

    #[error("Session cannot finish before it started")]
    FinishedBeforeStart,

    #[error("Session is not completed (currently {0})")]
    NotCompleted(&'static str),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Apply one event to a session
pub fn transition(state: SessionState, event: SessionEvent) -> Result<SessionState> {
    let state_name = state.name();
    let event_name = event.name();

    match (state, event) {
        (_, SessionEvent::Reset) => Ok(SessionState::Idle),

        (_, SessionEvent::Fail { message }) => {
            log::warn!("Dictation session failed: {}", message);
            Ok(SessionState::Error { message })
        }

        (
            SessionState::Idle | SessionState::Completed { .. } | SessionState::Error { .. },
            SessionEvent::Load { words, lesson },
        ) => {
            if words.is_empty() {
                return Err(SessionError::EmptyWordList);
            }
            Ok(SessionState::Ready { words, lesson })
        }

        (SessionState::Ready { words, lesson }, SessionEvent::Start { at }) => {
            Ok(SessionState::InProgress {
                words,
                inputs: Vec::new(),
                started_at: at,
                lesson,
            })
        }

        (
            SessionState::InProgress {
                words,
                mut inputs,
                started_at,
                lesson,
            },
            event @ (SessionEvent::Submit { .. } | SessionEvent::Skip),
        ) => {
            if inputs.len() >= words.len() {
                return Err(SessionError::NoCurrentWord);
            }
            inputs.push(match event {
                SessionEvent::Submit { input } => Some(input),
                _ => None,
            });
            Ok(SessionState::InProgress {
                words,
                inputs,
                started_at,
                lesson,
            })
        }

        (
            SessionState::InProgress {
                words,
                inputs,
                started_at,
                lesson,
            },
            SessionEvent::Finish { at },
        ) => {
            if at < started_at {
                return Err(SessionError::FinishedBeforeStart);
            }

            let results = words
                .iter()
                .enumerate()
                .map(|(i, word)| {
                    let input = inputs.get(i).cloned().flatten();
                    let is_correct = input.as_deref().map_or(false, |s| word.matches(s));
                    WordResult {
                        word_id: word.id.clone(),
                        input,
                        is_correct,
                    }
                })
                .collect();

            Ok(SessionState::Completed {
                words,
                results,
                started_at,
                completed_at: at,
                lesson,
            })
        }

        _ => Err(SessionError::InvalidTransition {
            state: state_name,
            event: event_name,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::models::{LessonRef, Word};
    use chrono::{Duration, TimeZone, Utc};

    fn words() -> Vec<Word> {
        vec![
            Word::new("en_w1", "apple", "en"),
            Word::new("en_w2", "banana", "en"),
            Word::new("en_w3", "cherry", "en"),
        ]
    }

    fn load() -> SessionEvent {
        SessionEvent::Load {
            words: words(),
            lesson: Some(LessonRef {
                id: "en_l1".into(),
                name: "Fruit Vocabulary".into(),
            }),
        }
    }

    #[test]
    fn test_full_session() {
        let start = Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap();

        let mut state = transition(SessionState::Idle, load()).unwrap();
        assert_eq!(state.name(), "ready");

        state = transition(state, SessionEvent::Start { at: start }).unwrap();
        assert_eq!(state.current_word().unwrap().id, "en_w1");

        state = transition(state, SessionEvent::Submit { input: "Apple".into() }).unwrap();
        state = transition(state, SessionEvent::Submit { input: "bananna".into() }).unwrap();
        assert_eq!(state.current_word().unwrap().id, "en_w3");

        state = transition(
            state,
            SessionEvent::Finish {
                at: start + Duration::seconds(30),
            },
        )
        .unwrap();

        let SessionState::Completed { results, .. } = &state else {
            panic!("expected completed state, got {}", state.name());
        };
        assert_eq!(
            results.iter().map(|r| r.is_correct).collect::<Vec<_>>(),
            vec![true, false, false]
        );
        assert_eq!(results[2].input, None);

        let summary = state.summary().unwrap();
        assert_eq!(summary.correct_words, 1);
        assert_eq!(summary.missed_word_ids, vec!["en_w2", "en_w3"]);
    }

    #[test]
    fn test_skip_records_no_input() {
        let start = Utc::now();
        let mut state = transition(SessionState::Idle, load()).unwrap();
        state = transition(state, SessionEvent::Start { at: start }).unwrap();
        state = transition(state, SessionEvent::Skip).unwrap();

        let SessionState::InProgress { inputs, .. } = &state else {
            panic!("expected in-progress state");
        };
        assert_eq!(inputs, &vec![None]);
    }

    #[test]
    fn test_rejects_empty_load() {
        let err = transition(
            SessionState::Idle,
            SessionEvent::Load {
                words: Vec::new(),
                lesson: None,
            },
        )
        .unwrap_err();
        assert_eq!(err, SessionError::EmptyWordList);
    }

    #[test]
    fn test_rejects_submit_past_last_word() {
        let mut state = transition(SessionState::Idle, load()).unwrap();
        state = transition(state, SessionEvent::Start { at: Utc::now() }).unwrap();
        for _ in 0..3 {
            state = transition(state, SessionEvent::Skip).unwrap();
        }
        assert!(state.current_word().is_none());

        let err = transition(state, SessionEvent::Submit { input: "x".into() }).unwrap_err();
        assert_eq!(err, SessionError::NoCurrentWord);
    }

    #[test]
    fn test_invalid_transitions() {
        let err = transition(SessionState::Idle, SessionEvent::Start { at: Utc::now() }).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidTransition {
                state: "idle",
                event: "start"
            }
        );

        let ready = transition(SessionState::Idle, load()).unwrap();
        assert!(transition(ready.clone(), SessionEvent::Skip).is_err());
        assert!(transition(ready, load()).is_err());
    }

    #[test]
    fn test_finish_before_start_is_rejected() {
        let start = Utc::now();
        let mut state = transition(SessionState::Idle, load()).unwrap();
        state = transition(state, SessionEvent::Start { at: start }).unwrap();

        let err = transition(
            state,
            SessionEvent::Finish {
                at: start - Duration::seconds(1),
            },
        )
        .unwrap_err();
        assert_eq!(err, SessionError::FinishedBeforeStart);
    }

    #[test]
    fn test_fail_and_reset_from_anywhere() {
        let ready = transition(SessionState::Idle, load()).unwrap();
        let failed = transition(
            ready,
            SessionEvent::Fail {
                message: "audio unavailable".into(),
            },
        )
        .unwrap();
        assert_eq!(failed.name(), "error");

        // A failed session can be reloaded
        let reloaded = transition(failed.clone(), load()).unwrap();
        assert_eq!(reloaded.name(), "ready");

        assert_eq!(transition(failed, SessionEvent::Reset).unwrap(), SessionState::Idle);
    }
}

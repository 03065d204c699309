//! Mistake-driven review scheduling
//!
//! Every recorded attempt moves a ledger entry along the interval ladder:
//!
//! - Incorrect: the mistake count grows, the correct streak drops to 0 and
//!   the word comes back after the shortest interval.
//! - Correct: the streak grows by one and the new streak indexes the
//!   ladder directly (streak 1 -> level 1, streak 2 -> level 2, ...),
//!   clamped to the top level.
//!
//! The next review is always anchored at the attempt instant. Mistake
//! counts are lifetime totals and are never decremented.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::intervals::IntervalTable;
use super::models::{Attempt, MistakeEntry};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Invalid ledger state for word '{word_id}': {reason}")]
    InvalidState { word_id: String, reason: String },

    #[error("Invalid interval table: {0}")]
    InvalidIntervals(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

fn invalid(entry_word: &str, reason: impl Into<String>) -> SchedulerError {
    SchedulerError::InvalidState {
        word_id: entry_word.to_string(),
        reason: reason.into(),
    }
}

/// Check the ledger invariants of a stored entry
pub fn validate_entry(entry: &MistakeEntry) -> Result<()> {
    if entry.user_id.trim().is_empty() {
        return Err(invalid(&entry.word_id, "user id is blank"));
    }
    if entry.word_id.trim().is_empty() {
        return Err(invalid(&entry.word_id, "word id is blank"));
    }
    if entry.total_attempts < entry.mistake_count {
        return Err(invalid(
            &entry.word_id,
            format!(
                "total attempts ({}) below mistake count ({})",
                entry.total_attempts, entry.mistake_count
            ),
        ));
    }
    if entry.correct_streak > entry.total_attempts - entry.mistake_count {
        return Err(invalid(
            &entry.word_id,
            format!(
                "correct streak ({}) exceeds correct attempts ({})",
                entry.correct_streak,
                entry.total_attempts - entry.mistake_count
            ),
        ));
    }
    if entry.next_review_at < entry.last_event_at {
        return Err(invalid(&entry.word_id, "next review precedes last attempt"));
    }
    Ok(())
}

/// Applies attempt outcomes to ledger entries
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    table: IntervalTable,
    /// Resolve an entry once its correct streak reaches this value
    auto_resolve_streak: Option<u32>,
}

impl Scheduler {
    pub fn new(table: IntervalTable) -> Self {
        Self {
            table,
            auto_resolve_streak: None,
        }
    }

    pub fn with_auto_resolve(mut self, streak: Option<u32>) -> Self {
        self.auto_resolve_streak = streak;
        self
    }

    pub fn table(&self) -> &IntervalTable {
        &self.table
    }

    pub fn auto_resolve_streak(&self) -> Option<u32> {
        self.auto_resolve_streak
    }

    /// Interval granted for a given correct streak
    pub fn interval_for_streak(&self, streak: u32) -> Duration {
        self.table.interval(streak as usize)
    }

    /// Compute the entry that results from one attempt.
    ///
    /// `entry` is the current ledger entry for the attempt's (user, word),
    /// or `None` if the word was never mistaken. A correct answer on an
    /// absent entry leaves nothing to schedule and yields `Ok(None)`.
    pub fn update_after_attempt(
        &self,
        entry: Option<&MistakeEntry>,
        attempt: &Attempt,
    ) -> Result<Option<MistakeEntry>> {
        let mut next = match entry {
            Some(existing) => {
                validate_entry(existing)?;
                if existing.user_id != attempt.user_id || existing.word_id != attempt.word_id {
                    return Err(invalid(
                        &existing.word_id,
                        format!(
                            "attempt for {}/{} applied to entry {}/{}",
                            attempt.user_id, attempt.word_id, existing.user_id, existing.word_id
                        ),
                    ));
                }
                if attempt.at < existing.last_event_at {
                    return Err(invalid(
                        &existing.word_id,
                        format!(
                            "attempt at {} predates last attempt at {}",
                            attempt.at.to_rfc3339(),
                            existing.last_event_at.to_rfc3339()
                        ),
                    ));
                }
                existing.clone()
            }
            None if attempt.is_correct => return Ok(None),
            None => {
                if attempt.user_id.trim().is_empty() || attempt.word_id.trim().is_empty() {
                    return Err(invalid(&attempt.word_id, "attempt has a blank id"));
                }
                MistakeEntry::blank(&attempt.user_id, &attempt.word_id, attempt.at)
            }
        };

        if attempt.is_correct {
            self.apply_correct(&mut next, attempt.at)?;
        } else {
            self.apply_mistake(&mut next, attempt.at)?;
        }

        debug_assert!(validate_entry(&next).is_ok());
        Ok(Some(next))
    }

    /// `now + interval`, or `InvalidState` past the representable range
    fn due_after(
        &self,
        word_id: &str,
        now: DateTime<Utc>,
        interval: Duration,
    ) -> Result<DateTime<Utc>> {
        now.checked_add_signed(interval).ok_or_else(|| {
            invalid(
                word_id,
                format!(
                    "next review {} after {} is out of range",
                    format_interval(interval),
                    now.to_rfc3339()
                ),
            )
        })
    }

    fn apply_mistake(&self, entry: &mut MistakeEntry, now: DateTime<Utc>) -> Result<()> {
        let next_review_at = self.due_after(&entry.word_id, now, self.table.shortest())?;
        entry.mistake_count = entry.mistake_count.saturating_add(1);
        entry.total_attempts = entry.total_attempts.saturating_add(1);
        entry.correct_streak = 0;
        entry.last_mistake_at = now;
        entry.last_event_at = now;
        entry.next_review_at = next_review_at;
        entry.updated_at = now;

        if entry.is_resolved {
            log::info!(
                "Reopening resolved word {} for {} after a mistake",
                entry.word_id,
                entry.user_id
            );
            entry.is_resolved = false;
        }

        log::debug!(
            "Mistake on {} (count {}), next review {}",
            entry.word_id,
            entry.mistake_count,
            entry.next_review_at
        );
        Ok(())
    }

    fn apply_correct(&self, entry: &mut MistakeEntry, now: DateTime<Utc>) -> Result<()> {
        let streak = entry.correct_streak.saturating_add(1);
        let interval = self.interval_for_streak(streak);
        let next_review_at = self.due_after(&entry.word_id, now, interval)?;
        entry.correct_streak = streak;
        entry.total_attempts = entry.total_attempts.saturating_add(1);
        entry.last_event_at = now;
        entry.next_review_at = next_review_at;
        entry.updated_at = now;

        if let Some(threshold) = self.auto_resolve_streak {
            if !entry.is_resolved && entry.correct_streak >= threshold {
                log::info!(
                    "Resolved word {} for {} after {} correct in a row",
                    entry.word_id,
                    entry.user_id,
                    entry.correct_streak
                );
                entry.is_resolved = true;
            }
        }

        log::debug!(
            "Correct on {} (streak {}), next review {}",
            entry.word_id,
            entry.correct_streak,
            entry.next_review_at
        );
        Ok(())
    }
}

/// Select the entries due at `now`, earliest first.
///
/// Resolved entries are skipped. Entries with the same due time keep
/// their input order, so callers should pass entries in creation order.
pub fn get_due_entries<'a, I>(entries: I, now: DateTime<Utc>) -> Vec<MistakeEntry>
where
    I: IntoIterator<Item = &'a MistakeEntry>,
{
    let mut due: Vec<MistakeEntry> = entries
        .into_iter()
        .filter(|e| e.is_due(now))
        .cloned()
        .collect();

    // sort_by is stable
    due.sort_by(|a, b| a.next_review_at.cmp(&b.next_review_at));
    due
}

/// Format an interval to a short human-readable string
pub fn format_interval(interval: Duration) -> String {
    let minutes = interval.num_minutes();
    if minutes <= 0 {
        "now".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if minutes < 24 * 60 {
        format!("{}h", interval.num_hours())
    } else {
        let days = interval.num_days();
        if days < 7 {
            format!("{}d", days)
        } else if days < 30 && days % 7 == 0 {
            format!("{}w", days / 7)
        } else if days < 30 {
            format!("{}d", days)
        } else if days < 365 {
            format!("{}mo", days / 30)
        } else {
            format!("{}y", days / 365)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::intervals::MAX_INTERVAL_MINUTES;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn scheduler() -> Scheduler {
        Scheduler::new(IntervalTable::ebbinghaus())
    }

    fn wrong(at: DateTime<Utc>) -> Attempt {
        Attempt::new("u1", "apple", false, at)
    }

    fn right(at: DateTime<Utc>) -> Attempt {
        Attempt::new("u1", "apple", true, at)
    }

    #[test]
    fn test_first_mistake_creates_entry() {
        let entry = scheduler()
            .update_after_attempt(None, &wrong(t0()))
            .unwrap()
            .unwrap();

        assert_eq!(entry.mistake_count, 1);
        assert_eq!(entry.correct_streak, 0);
        assert_eq!(entry.total_attempts, 1);
        assert_eq!(entry.last_mistake_at, t0());
        assert_eq!(entry.next_review_at, t0() + Duration::minutes(5));
        assert!(!entry.is_resolved);
    }

    #[test]
    fn test_correct_on_absent_entry_creates_nothing() {
        let result = scheduler().update_after_attempt(None, &right(t0())).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_correct_streak_indexes_ladder() {
        let s = scheduler();
        let mut entry = s.update_after_attempt(None, &wrong(t0())).unwrap().unwrap();

        let t1 = t0() + Duration::hours(1);
        entry = s.update_after_attempt(Some(&entry), &right(t1)).unwrap().unwrap();
        assert_eq!(entry.correct_streak, 1);
        assert_eq!(entry.next_review_at, t1 + Duration::minutes(30));

        let t2 = t1 + Duration::hours(1);
        entry = s.update_after_attempt(Some(&entry), &right(t2)).unwrap().unwrap();
        assert_eq!(entry.correct_streak, 2);
        assert_eq!(entry.next_review_at, t2 + Duration::hours(12));
        assert_eq!(entry.mistake_count, 1);
        assert_eq!(entry.total_attempts, 3);
    }

    #[test]
    fn test_mistake_resets_streak() {
        let s = scheduler();
        let mut entry = s.update_after_attempt(None, &wrong(t0())).unwrap().unwrap();
        let mut at = t0();
        for _ in 0..4 {
            at = at + Duration::days(1);
            entry = s.update_after_attempt(Some(&entry), &right(at)).unwrap().unwrap();
        }
        assert_eq!(entry.correct_streak, 4);

        at = at + Duration::days(1);
        let before = entry.mistake_count;
        entry = s.update_after_attempt(Some(&entry), &wrong(at)).unwrap().unwrap();
        assert_eq!(entry.correct_streak, 0);
        assert!(entry.mistake_count > before);
        assert_eq!(entry.last_mistake_at, at);
        assert_eq!(entry.next_review_at, at + Duration::minutes(5));
    }

    #[test]
    fn test_intervals_never_shrink_while_correct() {
        let s = scheduler();
        let mut entry = s.update_after_attempt(None, &wrong(t0())).unwrap().unwrap();
        let mut previous = Duration::zero();

        for _ in 0..15 {
            let at = entry.next_review_at;
            entry = s.update_after_attempt(Some(&entry), &right(at)).unwrap().unwrap();
            let interval = entry.next_review_at - at;
            assert!(interval >= previous);
            assert!(entry.total_attempts >= entry.mistake_count);
            previous = interval;
        }

        assert_eq!(previous, Duration::days(30));
    }

    #[test]
    fn test_auto_resolve_and_reopen() {
        let s = scheduler().with_auto_resolve(Some(2));
        let mut entry = s.update_after_attempt(None, &wrong(t0())).unwrap().unwrap();

        entry = s
            .update_after_attempt(Some(&entry), &right(t0() + Duration::hours(1)))
            .unwrap()
            .unwrap();
        assert!(!entry.is_resolved);

        entry = s
            .update_after_attempt(Some(&entry), &right(t0() + Duration::hours(2)))
            .unwrap()
            .unwrap();
        assert!(entry.is_resolved);

        entry = s
            .update_after_attempt(Some(&entry), &wrong(t0() + Duration::hours(3)))
            .unwrap()
            .unwrap();
        assert!(!entry.is_resolved);
        assert_eq!(entry.mistake_count, 2);
    }

    fn assert_rejected(s: &Scheduler, entry: &MistakeEntry) {
        let err = s
            .update_after_attempt(Some(entry), &right(t0() + Duration::hours(1)))
            .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidState { .. }));
    }

    #[test]
    fn test_invalid_entry_is_rejected() {
        let s = scheduler();
        let entry = s.update_after_attempt(None, &wrong(t0())).unwrap().unwrap();

        let mut fewer_attempts = entry.clone();
        fewer_attempts.total_attempts = 0;
        assert_rejected(&s, &fewer_attempts);

        let mut long_streak = entry.clone();
        long_streak.correct_streak = 1;
        assert_rejected(&s, &long_streak);

        let mut early_review = entry.clone();
        early_review.next_review_at = entry.last_event_at - Duration::seconds(1);
        assert_rejected(&s, &early_review);

        let mut blank_user = entry.clone();
        blank_user.user_id = " ".to_string();
        assert!(validate_entry(&blank_user).is_err());

        let mut blank_word = entry.clone();
        blank_word.word_id = String::new();
        assert!(validate_entry(&blank_word).is_err());

        assert!(validate_entry(&entry).is_ok());
    }

    #[test]
    fn test_first_mistake_with_blank_id_is_rejected() {
        let err = scheduler()
            .update_after_attempt(None, &Attempt::new("", "apple", false, t0()))
            .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidState { .. }));

        let err = scheduler()
            .update_after_attempt(None, &Attempt::new("u1", "  ", false, t0()))
            .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidState { .. }));
    }

    #[test]
    fn test_due_time_overflow_is_an_error() {
        let s = Scheduler::new(IntervalTable::from_minutes(&[5, 60]).unwrap());
        let late = DateTime::<Utc>::MAX_UTC - Duration::minutes(30);
        let entry = s
            .update_after_attempt(None, &wrong(late))
            .unwrap()
            .unwrap();

        let next = right(late + Duration::minutes(10));
        let err = s.update_after_attempt(Some(&entry), &next).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidState { .. }));

        // The longest accepted step still fits from an ordinary date
        let far = Scheduler::new(IntervalTable::from_minutes(&[5, MAX_INTERVAL_MINUTES]).unwrap());
        let entry = far.update_after_attempt(None, &wrong(t0())).unwrap().unwrap();
        let entry = far
            .update_after_attempt(Some(&entry), &right(t0() + Duration::hours(1)))
            .unwrap()
            .unwrap();
        assert_eq!(
            entry.next_review_at,
            t0() + Duration::hours(1) + Duration::minutes(MAX_INTERVAL_MINUTES)
        );
    }

    #[test]
    fn test_out_of_order_attempt_is_rejected() {
        let s = scheduler();
        let entry = s.update_after_attempt(None, &wrong(t0())).unwrap().unwrap();

        let err = s
            .update_after_attempt(Some(&entry), &right(t0() - Duration::minutes(1)))
            .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidState { .. }));
    }

    #[test]
    fn test_mismatched_key_is_rejected() {
        let s = scheduler();
        let entry = s.update_after_attempt(None, &wrong(t0())).unwrap().unwrap();
        let other = Attempt::new("u1", "banana", true, t0() + Duration::hours(1));

        assert!(s.update_after_attempt(Some(&entry), &other).is_err());
    }

    #[test]
    fn test_due_entries_ordered_and_filtered() {
        let now = t0();
        let mut a = MistakeEntry::blank("u1", "a", now - Duration::hours(2));
        a.next_review_at = now - Duration::minutes(10);
        let mut b = MistakeEntry::blank("u1", "b", now - Duration::hours(2));
        b.next_review_at = now - Duration::minutes(5);
        let mut c = MistakeEntry::blank("u1", "c", now - Duration::hours(2));
        c.next_review_at = now + Duration::hours(1);

        let entries = vec![b.clone(), c, a.clone()];
        let due = get_due_entries(&entries, now);
        assert_eq!(
            due.iter().map(|e| e.word_id.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );

        // Querying does not change anything
        assert_eq!(get_due_entries(&entries, now), due);
    }

    #[test]
    fn test_due_entries_ties_keep_input_order() {
        let now = t0();
        let due_at = now - Duration::minutes(1);
        let entries: Vec<MistakeEntry> = ["x", "y", "z"]
            .iter()
            .map(|w| {
                let mut e = MistakeEntry::blank("u1", w, now - Duration::hours(1));
                e.next_review_at = due_at;
                e
            })
            .collect();

        let due = get_due_entries(&entries, now);
        assert_eq!(
            due.iter().map(|e| e.word_id.as_str()).collect::<Vec<_>>(),
            vec!["x", "y", "z"]
        );
    }

    #[test]
    fn test_due_entries_skip_resolved() {
        let now = t0();
        let mut e = MistakeEntry::blank("u1", "a", now - Duration::hours(1));
        e.is_resolved = true;
        assert!(get_due_entries(&[e], now).is_empty());
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(Duration::zero()), "now");
        assert_eq!(format_interval(Duration::minutes(5)), "5m");
        assert_eq!(format_interval(Duration::minutes(30)), "30m");
        assert_eq!(format_interval(Duration::hours(12)), "12h");
        assert_eq!(format_interval(Duration::days(1)), "1d");
        assert_eq!(format_interval(Duration::days(4)), "4d");
        assert_eq!(format_interval(Duration::days(7)), "1w");
        assert_eq!(format_interval(Duration::days(15)), "15d");
        assert_eq!(format_interval(Duration::days(30)), "1mo");
        assert_eq!(format_interval(Duration::days(730)), "2y");
    }
}

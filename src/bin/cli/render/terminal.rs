use chrono::{DateTime, Utc};

use mew_review::review::scheduler::format_interval;
use mew_review::MistakeEntry;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap text in a color when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// "due", "resolved", or "in 3h" relative to `now`
pub fn due_label(entry: &MistakeEntry, now: DateTime<Utc>) -> String {
    if entry.is_resolved {
        "resolved".to_string()
    } else if entry.is_due(now) {
        "due".to_string()
    } else {
        format!("in {}", format_interval(entry.next_review_at - now))
    }
}

/// Colored status for an entry
pub fn status(entry: &MistakeEntry, now: DateTime<Utc>, use_color: bool) -> String {
    let label = due_label(entry, now);
    let color = if entry.is_resolved {
        Color::GRAY
    } else if entry.is_due(now) {
        Color::RED
    } else {
        Color::GREEN
    };
    paint(&label, color, use_color)
}

/// Truncate to a column width, adding "..." when cut
pub fn fit(text: &str, width: usize) -> String {
    if text.chars().count() > width && width > 3 {
        let cut: String = text.chars().take(width - 3).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Column width in characters for the widest value, within `[min, max]`
pub fn column_width<'a>(values: impl Iterator<Item = &'a str>, min: usize, max: usize) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(min)
        .clamp(min, max)
}

/// Print a table rule under a header
pub fn rule(widths: &[usize]) -> String {
    widths
        .iter()
        .map(|w| "\u{2500}".repeat(*w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// JSON view of an entry for `--format json`
pub fn entry_json(entry: &MistakeEntry, now: DateTime<Utc>) -> serde_json::Value {
    serde_json::json!({
        "wordId": entry.word_id,
        "userId": entry.user_id,
        "mistakeCount": entry.mistake_count,
        "correctStreak": entry.correct_streak,
        "totalAttempts": entry.total_attempts,
        "errorRate": entry.error_rate(),
        "lastMistakeAt": entry.last_mistake_at.to_rfc3339(),
        "lastEventAt": entry.last_event_at.to_rfc3339(),
        "nextReviewAt": entry.next_review_at.to_rfc3339(),
        "isResolved": entry.is_resolved,
        "isDue": entry.is_due(now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_width_counts_chars() {
        let words = ["猫", "にんじん", "cat"];
        assert_eq!(column_width(words.iter().copied(), 4, 30), 4);
        assert_eq!(column_width(["décembre"].into_iter(), 4, 30), 8);
        assert_eq!(column_width(std::iter::empty(), 4, 30), 4);
        assert_eq!(column_width(["x".repeat(40).as_str()].into_iter(), 4, 30), 30);
    }

    #[test]
    fn test_fit_matches_column_width() {
        let word = "ありがとうございました";
        let width = column_width([word].into_iter(), 4, 8);
        assert_eq!(fit(word, width).chars().count(), width);
    }
}

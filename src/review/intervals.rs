//! Review interval ladder
//!
//! Ebbinghaus-style spacing: level 0 is the shortest relearn delay and each
//! following level waits longer. The scheduler picks a level from the
//! entry's correct streak and clamps it to the ladder.

use chrono::Duration;

use super::scheduler::SchedulerError;

/// Default ladder in minutes: 5m, 30m, 12h, 1d, 2d, 4d, 7d, 15d, 30d
pub const DEFAULT_INTERVALS_MINUTES: [i64; 9] = [
    5,
    30,
    12 * 60,
    24 * 60,
    2 * 24 * 60,
    4 * 24 * 60,
    7 * 24 * 60,
    15 * 24 * 60,
    30 * 24 * 60,
];

/// Longest accepted step: ten years
pub const MAX_INTERVAL_MINUTES: i64 = 10 * 366 * 24 * 60;

/// Fixed, strictly increasing sequence of review delays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTable {
    steps: Vec<Duration>,
}

impl Default for IntervalTable {
    fn default() -> Self {
        Self::ebbinghaus()
    }
}

impl IntervalTable {
    /// The canonical nine-level ladder
    pub fn ebbinghaus() -> Self {
        Self {
            steps: DEFAULT_INTERVALS_MINUTES
                .iter()
                .map(|m| Duration::minutes(*m))
                .collect(),
        }
    }

    /// Build a ladder from minute values.
    ///
    /// The list must be non-empty, positive, strictly increasing and no
    /// longer than [`MAX_INTERVAL_MINUTES`] per step.
    pub fn from_minutes(minutes: &[i64]) -> Result<Self, SchedulerError> {
        if minutes.is_empty() {
            return Err(SchedulerError::InvalidIntervals(
                "interval table is empty".to_string(),
            ));
        }

        if let Some(m) = minutes.iter().find(|m| **m <= 0) {
            return Err(SchedulerError::InvalidIntervals(format!(
                "interval of {} minutes is not positive",
                m
            )));
        }

        if let Some(pair) = minutes.windows(2).find(|w| w[1] <= w[0]) {
            return Err(SchedulerError::InvalidIntervals(format!(
                "intervals must increase, got {} after {}",
                pair[1], pair[0]
            )));
        }

        if let Some(m) = minutes.iter().find(|m| **m > MAX_INTERVAL_MINUTES) {
            return Err(SchedulerError::InvalidIntervals(format!(
                "interval of {} minutes exceeds the {} minute limit",
                m, MAX_INTERVAL_MINUTES
            )));
        }

        let steps = minutes
            .iter()
            .map(|m| {
                Duration::try_minutes(*m).ok_or_else(|| {
                    SchedulerError::InvalidIntervals(format!(
                        "interval of {} minutes is out of range",
                        m
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { steps })
    }

    /// Number of levels
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Highest valid level index
    pub fn max_level(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// Clamp an arbitrary level into `[0, N-1]`
    pub fn clamp_level(&self, level: usize) -> usize {
        level.min(self.max_level())
    }

    /// Delay for a level, clamped to the top of the ladder
    pub fn interval(&self, level: usize) -> Duration {
        self.steps[self.clamp_level(level)]
    }

    /// Shortest delay, used right after a mistake
    pub fn shortest(&self) -> Duration {
        self.steps[0]
    }

    pub fn steps(&self) -> &[Duration] {
        &self.steps
    }
}

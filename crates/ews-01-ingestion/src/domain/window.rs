//! Consensus windows.
//!
//! Windows are anchored on the triggering event's stored timestamp, never
//! on wall clock, which keeps the pipeline tolerant of edge-node clock
//! skew up to the forward grace.

use chrono::{DateTime, Duration, Utc};

/// The bounded interval `[anchor − lookback, anchor + grace]` within which
/// readings are considered contemporaneous for quorum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingWindow {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Inclusive upper bound.
    pub end: DateTime<Utc>,
}

impl ReadingWindow {
    /// Build a window around an anchor timestamp.
    #[must_use]
    pub fn around(anchor: DateTime<Utc>, lookback_secs: i64, grace_secs: i64) -> Self {
        Self {
            start: anchor - Duration::seconds(lookback_secs),
            end: anchor + Duration::seconds(grace_secs),
        }
    }

    /// Whether a timestamp falls inside the window (inclusive both ends).
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, secs).unwrap()
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let window = ReadingWindow::around(t(30), 30, 5);
        assert!(window.contains(t(0)));
        assert!(window.contains(t(35)));
        assert!(window.contains(t(30)));
    }

    #[test]
    fn test_window_excludes_outside() {
        let window = ReadingWindow::around(t(30), 30, 5);
        assert!(!window.contains(t(36)));
        assert!(!window.contains(Utc.with_ymd_and_hms(2026, 3, 1, 11, 59, 59).unwrap()));
    }
}

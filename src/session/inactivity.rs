// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alertwave-rs

//! Restartable inactivity countdown

use chrono::{DateTime, Duration, Utc};

/// Countdown that converts a confirmed quiet period into an alarm request.
///
/// The timer holds a single deadline. Cancelling clears it before any
/// re-arm, and expiry is observed by polling on the engine tick, so a
/// stale firing cannot outlive a cancel. Re-arming always starts a fresh
/// full-length countdown: no partial credit.
#[derive(Debug, Default)]
pub struct InactivityTimer {
    deadline: Option<DateTime<Utc>>,
}

impl InactivityTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh countdown of `offset_minutes` from `now`. Any
    /// previous deadline is discarded.
    pub fn arm(&mut self, now: DateTime<Utc>, offset_minutes: u32) {
        self.deadline = Some(now + Duration::minutes(offset_minutes as i64));
    }

    /// Discard the countdown entirely.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Consume the deadline when it has passed. Yields at most once per
    /// arm.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(deadline)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 10, minute, second).unwrap()
    }

    #[test]
    fn test_poll_fires_once_at_deadline() {
        let mut timer = InactivityTimer::new();
        timer.arm(at(0, 0), 5);

        assert_eq!(timer.poll(at(4, 59)), None);
        assert_eq!(timer.poll(at(5, 0)), Some(at(5, 0)));
        assert_eq!(timer.poll(at(5, 1)), None, "expiry is consumed");
    }

    #[test]
    fn test_cancel_discards_state() {
        let mut timer = InactivityTimer::new();
        timer.arm(at(0, 0), 1);
        timer.cancel();

        assert!(!timer.is_armed());
        assert_eq!(timer.poll(at(10, 0)), None);
    }

    #[test]
    fn test_rearm_is_full_length() {
        let mut timer = InactivityTimer::new();
        timer.arm(at(0, 0), 5);
        // Halfway in, movement resets the countdown.
        timer.cancel();
        timer.arm(at(2, 30), 5);

        assert_eq!(timer.poll(at(5, 0)), None, "no credit for the first arm");
        assert_eq!(timer.poll(at(7, 30)), Some(at(7, 30)));
    }
}

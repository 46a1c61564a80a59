// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alertwave-rs

//! Bounded rolling window of recent samples, kept for charting only

use std::collections::VecDeque;

use super::MotionSample;

/// Number of samples retained for display.
pub const WINDOW_CAPACITY: usize = 50;

/// Rolling buffer handed to the chart collaborator. Scheduling logic never
/// reads it.
#[derive(Debug, Clone, Default)]
pub struct SampleWindow {
    samples: VecDeque<MotionSample>,
}

impl SampleWindow {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(WINDOW_CAPACITY),
        }
    }

    pub fn push(&mut self, sample: MotionSample) {
        self.samples.push_back(sample);
        while self.samples.len() > WINDOW_CAPACITY {
            self.samples.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&MotionSample> {
        self.samples.back()
    }

    /// Snapshot in arrival order for rendering.
    pub fn to_vec(&self) -> Vec<MotionSample> {
        self.samples.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample(i: usize) -> MotionSample {
        let t = Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap();
        MotionSample::new(i as f64, 0.0, 9.81, t)
    }

    #[test]
    fn test_window_is_bounded() {
        let mut window = SampleWindow::new();
        for i in 0..200 {
            window.push(sample(i));
        }
        assert_eq!(window.len(), WINDOW_CAPACITY);
        // Oldest entries fell off the front.
        assert_eq!(window.to_vec()[0].x, 150.0);
        assert_eq!(window.latest().unwrap().x, 199.0);
    }

    #[test]
    fn test_clear_empties_the_window() {
        let mut window = SampleWindow::new();
        window.push(sample(1));
        window.clear();
        assert!(window.is_empty());
        assert!(window.latest().is_none());
    }
}

// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alertwave-rs

//! Idle/Moving classification with hysteresis
//!
//! Two policies run side by side. Sudden movement is a per-axis delta
//! between consecutive samples, so a sharp jolt fires instantly no matter
//! where the magnitude sits. The Idle/Moving state that feeds the
//! inactivity countdown is magnitude over threshold, with a dwell period
//! before a return to Idle is confirmed, so isolated sensor noise cannot
//! flap the state.

use chrono::{DateTime, Duration, Utc};

use super::{MotionEvent, MotionSample, MovementState};

/// Per-axis jump between consecutive samples that counts as a sudden
/// movement, in raw accelerometer units.
const SUDDEN_DELTA: f64 = 1.5;

/// How long the magnitude must stay below threshold before a return to
/// Idle is confirmed.
const IDLE_DWELL_SECS: i64 = 2;

/// Turns the raw sample stream into discrete movement events.
#[derive(Debug, Default)]
pub struct MotionClassifier {
    state: MovementState,
    last_sample: Option<MotionSample>,
    below_since: Option<DateTime<Utc>>,
}

impl MotionClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MovementState {
        self.state
    }

    /// Forget all history and return to Idle.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed one sample. Returns the boundary events it produced, in order.
    pub fn classify(
        &mut self,
        sample: MotionSample,
        sensitivity_threshold: f64,
    ) -> Vec<MotionEvent> {
        let mut events = Vec::new();

        let sudden = self.last_sample.map_or(false, |prev| {
            (sample.x - prev.x).abs() > SUDDEN_DELTA
                || (sample.y - prev.y).abs() > SUDDEN_DELTA
                || (sample.z - prev.z).abs() > SUDDEN_DELTA
        });
        if sudden {
            events.push(MotionEvent::SuddenMovement);
        }

        // A sudden jolt counts as movement even when the magnitude stays
        // under the threshold.
        let above = sudden || sample.magnitude() > sensitivity_threshold;

        match self.state {
            MovementState::Idle => {
                if above {
                    self.state = MovementState::Moving;
                    self.below_since = None;
                    events.push(MotionEvent::EnteredMoving);
                }
            }
            MovementState::Moving => {
                if above {
                    self.below_since = None;
                } else {
                    let since = *self.below_since.get_or_insert(sample.t);
                    if sample.t - since >= Duration::seconds(IDLE_DWELL_SECS) {
                        self.state = MovementState::Idle;
                        self.below_since = None;
                        events.push(MotionEvent::EnteredIdle);
                    }
                }
            }
        }

        self.last_sample = Some(sample);
        events
    }
}

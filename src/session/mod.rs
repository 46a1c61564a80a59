//! Monitoring session - binds classification to the inactivity countdown

mod inactivity;

pub use inactivity::InactivityTimer;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::Config;
use crate::motion::{MotionClassifier, MotionEvent, MotionSample, MovementState, SampleWindow};

/// What the session asks the engine to do after digesting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// A sudden movement calls for an immediately ringing alarm.
    TriggerImmediateAlarm,
    /// The quiet period ran out. Schedule an offset alarm for the carried
    /// deadline; the session has already disabled itself.
    InactivityElapsed(DateTime<Utc>),
    MovementStarted,
    MovementEnded,
}

/// The single on/off toggle the UI drives. Owns the classifier, the
/// display window and the countdown; the engine feeds it samples and
/// ticks. At most one session is active per engine.
#[derive(Debug, Default)]
pub struct MonitoringSession {
    active: bool,
    classifier: MotionClassifier,
    window: SampleWindow,
    inactivity: InactivityTimer,
}

impl MonitoringSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn movement_state(&self) -> MovementState {
        self.classifier.state()
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    /// Arm monitoring: fresh window, classifier back to Idle, full
    /// countdown primed.
    pub fn start(&mut self, now: DateTime<Utc>, config: &Config) {
        self.active = true;
        self.window.clear();
        self.classifier.reset();
        self.inactivity.arm(now, config.alarm.offset_minutes);
        info!(
            "monitoring started (sensitivity {}, offset {} min)",
            config.monitor.sensitivity_threshold, config.alarm.offset_minutes
        );
    }

    /// Disarm monitoring. Already-created alarms are untouched.
    pub fn stop(&mut self) {
        self.active = false;
        self.inactivity.cancel();
        info!("monitoring stopped");
    }

    /// Digest one sensor sample. Ignored while inactive.
    pub fn handle_sample(&mut self, sample: MotionSample, config: &Config) -> Vec<SessionAction> {
        if !self.active {
            return Vec::new();
        }
        self.window.push(sample);

        let mut actions = Vec::new();
        for event in self
            .classifier
            .classify(sample, config.monitor.sensitivity_threshold)
        {
            match event {
                MotionEvent::SuddenMovement => {
                    debug!("sudden movement at {}", sample.t);
                    actions.push(SessionAction::TriggerImmediateAlarm);
                }
                MotionEvent::EnteredMoving => {
                    self.inactivity.cancel();
                    actions.push(SessionAction::MovementStarted);
                }
                MotionEvent::EnteredIdle => {
                    self.inactivity.arm(sample.t, config.alarm.offset_minutes);
                    actions.push(SessionAction::MovementEnded);
                }
            }
        }
        actions
    }

    /// Advance the countdown on the engine tick. On expiry the session
    /// stops itself: once inactivity is confirmed, the purpose of
    /// monitoring is fulfilled.
    pub fn on_tick(&mut self, now: DateTime<Utc>) -> Option<SessionAction> {
        if !self.active {
            return None;
        }
        let deadline = self.inactivity.poll(now)?;
        self.stop();
        Some(SessionAction::InactivityElapsed(deadline))
    }

    /// Re-arm an active countdown under the current offset. A clean
    /// restart of the full length, not a rescale of the remaining time.
    pub fn on_config_changed(&mut self, now: DateTime<Utc>, config: &Config) {
        if self.active && self.inactivity.is_armed() {
            self.inactivity.arm(now, config.alarm.offset_minutes);
            debug!("countdown re-armed for {} min", config.alarm.offset_minutes);
        }
    }
}

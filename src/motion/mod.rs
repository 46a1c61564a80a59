//! Motion module - sample types, classification and simulation

mod classifier;
mod simulator;
mod window;

pub use classifier::MotionClassifier;
pub use simulator::MotionSimulator;
pub use window::{SampleWindow, WINDOW_CAPACITY};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchedulerError;

/// A raw tri-axial accelerometer reading, gravity included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub t: DateTime<Utc>,
}

impl MotionSample {
    pub fn new(x: f64, y: f64, z: f64, t: DateTime<Utc>) -> Self {
        Self { x, y, z, t }
    }

    /// Euclidean norm of the three axes.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Movement state of the monitored device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementState {
    #[default]
    Idle,
    Moving,
}

/// Discrete boundary events produced by the classifier. A sample that does
/// not cross a boundary produces nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionEvent {
    /// A per-axis jump large enough to raise an alarm on the spot.
    SuddenMovement,
    /// The magnitude crossed above the sensitivity threshold.
    EnteredMoving,
    /// The magnitude stayed below threshold for the full dwell period.
    EnteredIdle,
}

/// Trait for motion sample providers.
#[async_trait]
pub trait MotionSource: Send {
    /// Provider identifier for diagnostics.
    fn id(&self) -> &str;

    /// Nominal sample rate in Hz. The scheduler does not rely on it; the
    /// stream cadence is sensor-driven.
    fn sample_rate(&self) -> f64;

    /// Produce the next reading. Pends until one is available.
    async fn next_sample(&mut self) -> Result<MotionSample, SchedulerError>;
}

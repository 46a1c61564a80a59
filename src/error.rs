// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alertwave-rs

//! Error taxonomy for the scheduler core
//!
//! Nothing here is fatal to the process. Every variant describes a local,
//! recoverable condition: the engine surfaces it as an advisory notice and
//! stays operable.

use thiserror::Error;

/// Errors surfaced by the scheduler core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// A configuration write was outside the allowed range. The prior
    /// value is kept.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A wall-clock time string could not be parsed as HH:MM.
    #[error("invalid alarm time: {0}")]
    InvalidTime(String),

    /// An operation targeted an alarm id that is not in the registry.
    #[error("unknown alarm id {0}")]
    UnknownAlarmId(u64),

    /// Snooze was requested for an alarm that is not currently ringing.
    #[error("alarm {0} is not ringing")]
    NotRinging(u64),

    /// Playback could not start or stop. Ringing state is unaffected and
    /// the alarm can still be stopped or snoozed by id.
    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),

    /// The motion stream produced no reading. Monitoring stays on in a
    /// degraded mode; no state transitions occur until samples return.
    #[error("sensor unavailable: {0}")]
    SensorUnavailable(String),
}

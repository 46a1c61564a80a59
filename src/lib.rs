// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alertwave-rs

//! AlertWave - Motion-Triggered Alarm Scheduler
//!
//! Arms motion-sensitive monitoring on a handheld device and wires it into
//! a personal alarm clock:
//! - explicit alarms fire at a wall-clock HH:MM
//! - a confirmed quiet period schedules an offset alarm automatically
//! - a sudden large movement raises an alarm on the spot
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Clock Engine (1 Hz)                  │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌─────────┐  ┌────────────┐  ┌───────────┐  ┌────────┐  │
//! │  │ Motion  │→ │ Monitoring │→ │   Alarm   │→ │ Audio  │  │
//! │  │ Source  │  │  Session   │  │ Registry  │  │  Sink  │  │
//! │  └─────────┘  └────────────┘  └───────────┘  └────────┘  │
//! │       ↓             ↓               ↓                    │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │                     Event Bus                      │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering, playback device I/O, toasts and routing are external
//! collaborators behind the traits and channels in this crate; nothing
//! here persists across a process restart.

#![warn(missing_docs)]
#![allow(dead_code)]

pub mod alarm;
pub mod audio;
pub mod config;
pub mod core;
pub mod error;
pub mod motion;
pub mod session;

// Re-exports for convenience
pub use crate::alarm::{Alarm, AlarmOrigin, AlarmRegistry, AlarmState, AlarmTime, AlarmView};
pub use crate::audio::{AudioSink, AudioSource, LogAudio, NullAudio};
pub use crate::config::Config;
pub use crate::core::{
    Clock, ClockEngine, Command, EngineHandle, EventBus, Notification, Snapshot, SystemClock,
};
pub use crate::error::SchedulerError;
pub use crate::motion::{MotionClassifier, MotionSample, MotionSimulator, MotionSource, MovementState};
pub use crate::session::MonitoringSession;

/// AlertWave version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// AlertWave name
pub const NAME: &str = "AlertWave";

// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alertwave-rs

//! Audio collaborator seam
//!
//! The scheduler only commands start/stop. Playback is fire-and-forget:
//! the engine logs failures and keeps its ringing state, so an alarm can
//! still be stopped or snoozed when the device is unusable.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SchedulerError;

/// Sound used when the user has not picked one.
pub const DEFAULT_SOURCE: &str = "default-alarm.mp3";

/// Handle to a user-selected alarm sound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSource {
    pub name: String,
}

impl AudioSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Default for AudioSource {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE)
    }
}

/// Playback device commands. Implementations must return promptly; the
/// engine never waits on the device.
pub trait AudioSink: Send {
    fn set_source(&mut self, source: AudioSource);

    fn play(&mut self, looped: bool) -> Result<(), SchedulerError>;

    fn stop(&mut self) -> Result<(), SchedulerError>;
}

/// Sink that only logs, for headless and demo runs.
#[derive(Debug, Default)]
pub struct LogAudio {
    source: AudioSource,
    playing: bool,
}

impl AudioSink for LogAudio {
    fn set_source(&mut self, source: AudioSource) {
        info!("alarm sound set to {}", source.name);
        self.source = source;
    }

    fn play(&mut self, looped: bool) -> Result<(), SchedulerError> {
        self.playing = true;
        info!("playing {} (loop: {})", self.source.name, looped);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SchedulerError> {
        if self.playing {
            self.playing = false;
            info!("playback stopped");
        }
        Ok(())
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn set_source(&mut self, _source: AudioSource) {}

    fn play(&mut self, _looped: bool) -> Result<(), SchedulerError> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SchedulerError> {
        Ok(())
    }
}

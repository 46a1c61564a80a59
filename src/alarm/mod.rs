//! Alarm records and the registry that owns them

mod registry;

pub use registry::AlarmRegistry;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchedulerError;

/// Wall-clock alarm time at minute granularity. Seconds and below are
/// never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlarmTime {
    hour: u8,
    minute: u8,
}

impl AlarmTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, SchedulerError> {
        if hour > 23 || minute > 59 {
            return Err(SchedulerError::InvalidTime(format!(
                "{:02}:{:02} is not a wall-clock time",
                hour, minute
            )));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Truncate an instant to its HH:MM.
    pub fn from_datetime(t: DateTime<Utc>) -> Self {
        Self {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour as u32
    }

    pub fn minute(&self) -> u32 {
        self.minute as u32
    }

    /// True when the given instant falls inside this minute.
    pub fn matches(&self, now: DateTime<Utc>) -> bool {
        now.hour() == self.hour() && now.minute() == self.minute()
    }
}

impl fmt::Display for AlarmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for AlarmTime {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| SchedulerError::InvalidTime(s.to_string()))?;
        let hour: u32 = h
            .parse()
            .map_err(|_| SchedulerError::InvalidTime(s.to_string()))?;
        let minute: u32 = m
            .parse()
            .map_err(|_| SchedulerError::InvalidTime(s.to_string()))?;
        Self::new(hour, minute)
    }
}

/// Lifecycle state of an alarm record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmState {
    Scheduled,
    Ringing,
}

/// How an alarm came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmOrigin {
    /// Entered by the user at a fixed wall-clock time.
    Explicit,
    /// Resolved from "now plus N minutes", by the user or by the
    /// inactivity countdown.
    Offset,
    /// Created by snoozing the referenced alarm.
    Snooze(u64),
    /// Raised directly by a sudden movement while monitoring.
    Motion,
}

/// A single alarm record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: u64,
    pub time: AlarmTime,
    pub state: AlarmState,
    pub origin: AlarmOrigin,
    /// Minute at which this alarm last transitioned to Ringing. Once set,
    /// the record is inert: it never re-triggers at its original time.
    pub fired_at: Option<DateTime<Utc>>,
}

impl Alarm {
    pub fn is_ringing(&self) -> bool {
        self.state == AlarmState::Ringing
    }

    /// Row for the alarm list view model.
    pub fn view(&self) -> AlarmView {
        AlarmView {
            id: self.id,
            time: self.time,
            state: self.state,
        }
    }
}

/// Row of the insertion-ordered alarm list handed to the rendering
/// collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmView {
    pub id: u64,
    pub time: AlarmTime,
    pub state: AlarmState,
}

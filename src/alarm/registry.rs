// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alertwave-rs

//! Alarm registry - add, ring, snooze, delete

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::{Alarm, AlarmOrigin, AlarmState, AlarmTime, AlarmView};
use crate::error::SchedulerError;

/// Owns the set of alarm records and enforces their lifecycle invariants.
///
/// Ids come from a counter that never repeats for the registry's lifetime,
/// so rapid successive adds cannot collide. Records keep their insertion
/// order; the list view model is deliberately not time-sorted.
#[derive(Debug, Default)]
pub struct AlarmRegistry {
    alarms: Vec<Alarm>,
    next_id: u64,
}

impl AlarmRegistry {
    pub fn new() -> Self {
        Self {
            alarms: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a Scheduled alarm at a fixed wall-clock time.
    pub fn add_at(&mut self, time: AlarmTime, origin: AlarmOrigin) -> Alarm {
        let id = self.next_id;
        self.next_id += 1;
        let alarm = Alarm {
            id,
            time,
            state: AlarmState::Scheduled,
            origin,
            fired_at: None,
        };
        debug!("alarm {} scheduled for {} ({:?})", id, time, origin);
        self.alarms.push(alarm.clone());
        alarm
    }

    /// Create a Scheduled alarm `offset_minutes` from `now`. The time is
    /// resolved once, here, and never re-evaluated.
    pub fn add_in(&mut self, offset_minutes: u32, now: DateTime<Utc>, origin: AlarmOrigin) -> Alarm {
        let time = AlarmTime::from_datetime(now + Duration::minutes(offset_minutes as i64));
        self.add_at(time, origin)
    }

    /// Ids of Scheduled alarms due at `now`. Alarms that have fired once,
    /// at any point, are skipped.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<u64> {
        self.alarms
            .iter()
            .filter(|a| {
                a.state == AlarmState::Scheduled && a.fired_at.is_none() && a.time.matches(now)
            })
            .map(|a| a.id)
            .collect()
    }

    /// Scheduled -> Ringing, stamping the firing minute. Absent or
    /// already-ringing ids are a silent no-op, which is what bounds the
    /// transition to once per matching minute.
    pub fn mark_ringing(&mut self, id: u64, now: DateTime<Utc>) -> Option<Alarm> {
        let alarm = self.alarms.iter_mut().find(|a| a.id == id)?;
        if alarm.state == AlarmState::Ringing {
            return None;
        }
        alarm.state = AlarmState::Ringing;
        alarm.fired_at = Some(now);
        Some(alarm.clone())
    }

    /// Take an alarm out of the currently-sounding set. The record stays
    /// until deleted or snoozed; its firing stamp keeps it from
    /// re-triggering.
    pub fn stop(&mut self, id: u64) -> Result<(), SchedulerError> {
        let alarm = self
            .alarms
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(SchedulerError::UnknownAlarmId(id))?;
        alarm.state = AlarmState::Scheduled;
        Ok(())
    }

    /// Stop a ringing alarm and create an independent Scheduled alarm
    /// `snooze_minutes` from now. The original keeps its time and stays in
    /// the registry.
    pub fn snooze(
        &mut self,
        id: u64,
        snooze_minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<Alarm, SchedulerError> {
        let alarm = self
            .alarms
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(SchedulerError::UnknownAlarmId(id))?;
        if alarm.state != AlarmState::Ringing {
            return Err(SchedulerError::NotRinging(id));
        }
        alarm.state = AlarmState::Scheduled;
        Ok(self.add_in(snooze_minutes, now, AlarmOrigin::Snooze(id)))
    }

    /// Remove a record unconditionally. Returns the removed alarm so the
    /// caller can silence audio if it was ringing.
    pub fn delete(&mut self, id: u64) -> Result<Alarm, SchedulerError> {
        let idx = self
            .alarms
            .iter()
            .position(|a| a.id == id)
            .ok_or(SchedulerError::UnknownAlarmId(id))?;
        Ok(self.alarms.remove(idx))
    }

    pub fn get(&self, id: u64) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == id)
    }

    pub fn any_ringing(&self) -> bool {
        self.alarms.iter().any(Alarm::is_ringing)
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    /// Insertion-ordered rows for the list collaborator.
    pub fn view(&self) -> Vec<AlarmView> {
        self.alarms.iter().map(Alarm::view).collect()
    }
}

//! Clock engine - the serialized heart of the scheduler
//!
//! One task owns every mutable piece. Samples, user commands and the 1 Hz
//! tick drain through a single select loop, so no two handlers ever run
//! concurrently against the registry or the movement state. Within one
//! tick, session work (inactivity expiry) runs before alarm matching, so
//! an alarm created by this tick's expiry rings on this same tick.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use crate::alarm::{AlarmOrigin, AlarmRegistry, AlarmTime, AlarmView};
use crate::audio::{AudioSink, AudioSource};
use crate::config::Config;
use crate::error::SchedulerError;
use crate::motion::{MotionSample, MovementState};
use crate::session::{MonitoringSession, SessionAction};

use super::clock::Clock;
use super::event_bus::{EventBus, Notification, NoticeLevel};

const COMMAND_QUEUE: usize = 64;
const SAMPLE_QUEUE: usize = 256;

/// Commands accepted from the UI collaborator.
#[derive(Debug, Clone)]
pub enum Command {
    SetSensitivity(f64),
    SetOffsetMinutes(u32),
    SetSnoozeMinutes(u32),
    ToggleMonitoring,
    AddAlarm(AlarmTime),
    AddOffsetAlarm,
    Snooze(u64),
    StopAlarm(u64),
    DeleteAlarm(u64),
    SetAudioSource(AudioSource),
}

/// Read-only state published for rendering collaborators.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub monitoring: bool,
    pub movement: MovementState,
    pub current_magnitude: f64,
    pub samples: Vec<MotionSample>,
    pub alarms: Vec<AlarmView>,
}

/// Cloneable handle for feeding the engine from outside the loop.
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<Command>,
    samples: mpsc::Sender<MotionSample>,
    snapshot: Arc<RwLock<Snapshot>>,
}

impl EngineHandle {
    /// Queue a user command. Returns false once the engine is gone.
    pub async fn send(&self, command: Command) -> bool {
        if self.commands.send(command).await.is_err() {
            warn!("engine is gone; command dropped");
            return false;
        }
        true
    }

    /// Queue a sensor reading. Returns false once the engine is gone.
    pub async fn submit_sample(&self, sample: MotionSample) -> bool {
        self.samples.send(sample).await.is_ok()
    }

    /// Latest published view of the system.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.read().clone()
    }
}

/// Drives the 1 Hz tick and owns the registry, the session and the audio
/// command surface.
pub struct ClockEngine {
    config: Config,
    registry: AlarmRegistry,
    session: MonitoringSession,
    clock: Arc<dyn Clock>,
    audio: Box<dyn AudioSink>,
    bus: Arc<EventBus>,
    commands: mpsc::Receiver<Command>,
    samples: mpsc::Receiver<MotionSample>,
    snapshot: Arc<RwLock<Snapshot>>,
}

impl ClockEngine {
    pub fn new(
        config: Config,
        clock: Arc<dyn Clock>,
        audio: Box<dyn AudioSink>,
        bus: Arc<EventBus>,
    ) -> (Self, EngineHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
        let (sample_tx, sample_rx) = mpsc::channel(SAMPLE_QUEUE);
        let snapshot = Arc::new(RwLock::new(Snapshot::default()));

        let handle = EngineHandle {
            commands: command_tx,
            samples: sample_tx,
            snapshot: snapshot.clone(),
        };

        let engine = Self {
            config,
            registry: AlarmRegistry::new(),
            session: MonitoringSession::new(),
            clock,
            audio,
            bus,
            commands: command_rx,
            samples: sample_rx,
            snapshot,
        };

        (engine, handle)
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        info!("clock engine started");

        let mut tick = interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                Some(sample) = self.samples.recv() => self.handle_sample(sample),
                Some(command) = self.commands.recv() => self.handle_command(command),
                _ = tick.tick() => self.handle_tick(),
                _ = shutdown.recv() => {
                    info!("clock engine shutting down");
                    break;
                }
                else => break,
            }
        }

        Ok(())
    }

    fn handle_sample(&mut self, sample: MotionSample) {
        self.bus.publish_sample(sample);

        if !self.session.is_active() {
            return;
        }
        let now = self.clock.now();
        for action in self.session.handle_sample(sample, &self.config) {
            self.apply_session_action(action, now);
        }
        self.refresh_snapshot();
    }

    /// One 1 Hz step: session first, then alarm matching.
    fn handle_tick(&mut self) {
        let now = self.clock.now();

        if let Some(action) = self.session.on_tick(now) {
            self.apply_session_action(action, now);
        }

        for id in self.registry.due(now) {
            self.ring(id, now);
        }

        self.refresh_snapshot();
    }

    fn handle_command(&mut self, command: Command) {
        let now = self.clock.now();

        match command {
            Command::SetSensitivity(value) => {
                if let Err(e) = self.config.set_sensitivity(value) {
                    self.reject(e);
                } else {
                    debug!("sensitivity set to {}", value);
                }
            }
            Command::SetOffsetMinutes(minutes) => {
                if let Err(e) = self.config.set_offset_minutes(minutes) {
                    self.reject(e);
                } else {
                    // A live countdown restarts in full under the new value.
                    self.session.on_config_changed(now, &self.config);
                }
            }
            Command::SetSnoozeMinutes(minutes) => {
                if let Err(e) = self.config.set_snooze_minutes(minutes) {
                    self.reject(e);
                }
            }
            Command::ToggleMonitoring => {
                if self.session.is_active() {
                    self.session.stop();
                } else {
                    self.session.start(now, &self.config);
                }
            }
            Command::AddAlarm(time) => {
                let alarm = self.registry.add_at(time, AlarmOrigin::Explicit);
                self.bus.publish(Notification::AlarmAdded(alarm.view()));
            }
            Command::AddOffsetAlarm => {
                let alarm =
                    self.registry
                        .add_in(self.config.alarm.offset_minutes, now, AlarmOrigin::Offset);
                self.bus.publish(Notification::AlarmAdded(alarm.view()));
            }
            Command::Snooze(id) => {
                match self
                    .registry
                    .snooze(id, self.config.alarm.snooze_minutes, now)
                {
                    Ok(replacement) => {
                        self.silence_if_quiet();
                        info!(
                            "alarm {} snoozed for {} min (replacement {})",
                            id, self.config.alarm.snooze_minutes, replacement.id
                        );
                        self.bus.publish(Notification::AlarmSnoozed {
                            original: id,
                            replacement: replacement.view(),
                        });
                    }
                    Err(e) => self.reject(e),
                }
            }
            Command::StopAlarm(id) => match self.registry.stop(id) {
                Ok(()) => {
                    self.silence_if_quiet();
                    info!("alarm {} stopped", id);
                }
                Err(e) => self.reject(e),
            },
            Command::DeleteAlarm(id) => match self.registry.delete(id) {
                Ok(removed) => {
                    if removed.is_ringing() {
                        self.silence_if_quiet();
                    }
                    self.bus.publish(Notification::AlarmDeleted(id));
                }
                Err(e) => self.reject(e),
            },
            Command::SetAudioSource(source) => {
                self.audio.set_source(source);
            }
        }

        self.refresh_snapshot();
    }

    fn apply_session_action(&mut self, action: SessionAction, now: DateTime<Utc>) {
        match action {
            SessionAction::MovementStarted => self.bus.publish(Notification::MovementStarted),
            SessionAction::MovementEnded => self.bus.publish(Notification::MovementEnded),
            SessionAction::TriggerImmediateAlarm => self.trigger_motion_alarm(now),
            SessionAction::InactivityElapsed(deadline) => self.create_offset_alarm(deadline),
        }
    }

    /// A sudden movement raises an alarm on the spot. While something is
    /// already sounding, another record would add nothing.
    fn trigger_motion_alarm(&mut self, now: DateTime<Utc>) {
        if self.registry.any_ringing() {
            return;
        }
        let alarm = self
            .registry
            .add_at(AlarmTime::from_datetime(now), AlarmOrigin::Motion);
        self.bus.publish(Notification::AlarmAdded(alarm.view()));
        self.ring(alarm.id, now);
    }

    /// The countdown ran out. The alarm time is the deadline itself, so a
    /// countdown armed at 10:00:12 with a one minute offset produces a
    /// 10:01 alarm.
    fn create_offset_alarm(&mut self, deadline: DateTime<Utc>) {
        let alarm = self
            .registry
            .add_at(AlarmTime::from_datetime(deadline), AlarmOrigin::Offset);
        info!("inactivity elapsed; alarm {} set for {}", alarm.id, alarm.time);
        self.bus.publish(Notification::AlarmAdded(alarm.view()));
    }

    fn ring(&mut self, id: u64, now: DateTime<Utc>) {
        if let Some(alarm) = self.registry.mark_ringing(id, now) {
            info!("alarm {} ringing at {}", alarm.id, alarm.time);
            self.bus.publish(Notification::AlarmRinging(alarm.view()));
            if let Err(e) = self.audio.play(true) {
                warn!("{}", e);
            }
        }
    }

    /// Stop playback once nothing is ringing anymore.
    fn silence_if_quiet(&mut self) {
        if !self.registry.any_ringing() {
            if let Err(e) = self.audio.stop() {
                warn!("{}", e);
            }
        }
    }

    fn reject(&self, error: SchedulerError) {
        warn!("{}", error);
        self.bus.notice(NoticeLevel::Warning, &error.to_string());
    }

    fn refresh_snapshot(&self) {
        let mut snapshot = self.snapshot.write();
        snapshot.monitoring = self.session.is_active();
        snapshot.movement = self.session.movement_state();
        snapshot.current_magnitude = self
            .session
            .window()
            .latest()
            .map(|s| s.magnitude())
            .unwrap_or(0.0);
        snapshot.samples = self.session.window().to_vec();
        snapshot.alarms = self.registry.view();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::AlarmState;
    use crate::core::clock::ManualClock;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use parking_lot::Mutex;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, minute, second).unwrap()
    }

    fn time(hour: u32, minute: u32) -> AlarmTime {
        AlarmTime::new(hour, minute).unwrap()
    }

    #[derive(Debug, Default)]
    struct AudioLog {
        plays: usize,
        stops: usize,
        fail: bool,
    }

    /// Recording sink; can be flipped into a failing device.
    #[derive(Clone, Default)]
    struct RecordingAudio {
        log: Arc<Mutex<AudioLog>>,
    }

    impl AudioSink for RecordingAudio {
        fn set_source(&mut self, _source: AudioSource) {}

        fn play(&mut self, _looped: bool) -> Result<(), SchedulerError> {
            let mut log = self.log.lock();
            if log.fail {
                return Err(SchedulerError::AudioUnavailable("device lost".into()));
            }
            log.plays += 1;
            Ok(())
        }

        fn stop(&mut self) -> Result<(), SchedulerError> {
            let mut log = self.log.lock();
            if log.fail {
                return Err(SchedulerError::AudioUnavailable("device lost".into()));
            }
            log.stops += 1;
            Ok(())
        }
    }

    struct Rig {
        engine: ClockEngine,
        clock: Arc<ManualClock>,
        audio: RecordingAudio,
        bus: Arc<EventBus>,
    }

    fn rig(start: DateTime<Utc>, config: Config) -> Rig {
        let clock = Arc::new(ManualClock::new(start));
        let audio = RecordingAudio::default();
        let bus = Arc::new(EventBus::new(64));
        let (engine, _handle) =
            ClockEngine::new(config, clock.clone(), Box::new(audio.clone()), bus.clone());
        Rig {
            engine,
            clock,
            audio,
            bus,
        }
    }

    fn drain(rx: &mut broadcast::Receiver<crate::core::Event>) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event.notification);
        }
        out
    }

    #[test]
    fn test_identical_times_ring_on_the_same_tick() {
        let mut r = rig(at(8, 59, 0), Config::default());
        r.engine.handle_command(Command::AddAlarm(time(9, 0)));
        r.engine.handle_command(Command::AddAlarm(time(9, 0)));

        r.clock.set(at(9, 0, 0));
        r.engine.handle_tick();

        let ringing: Vec<u64> = r
            .engine
            .registry
            .view()
            .iter()
            .filter(|v| v.state == AlarmState::Ringing)
            .map(|v| v.id)
            .collect();
        assert_eq!(ringing.len(), 2);

        // Deleting one leaves the other ringing.
        r.engine.handle_command(Command::DeleteAlarm(ringing[0]));
        assert!(r.engine.registry.get(ringing[1]).unwrap().is_ringing());
        // Audio keeps sounding for the survivor.
        assert_eq!(r.audio.log.lock().stops, 0);
    }

    #[test]
    fn test_one_ringing_transition_per_matching_minute() {
        let mut r = rig(at(8, 59, 59), Config::default());
        r.engine.handle_command(Command::AddAlarm(time(9, 0)));
        let id = r.engine.registry.view()[0].id;

        r.clock.set(at(9, 0, 0));
        r.engine.handle_tick();
        r.clock.set(at(9, 0, 1));
        r.engine.handle_tick();
        assert_eq!(r.audio.log.lock().plays, 1);

        // Even stopped, the alarm stays inert for the rest of the minute.
        r.engine.handle_command(Command::StopAlarm(id));
        r.clock.set(at(9, 0, 2));
        r.engine.handle_tick();
        assert_eq!(r.audio.log.lock().plays, 1);
        assert!(!r.engine.registry.get(id).unwrap().is_ringing());
    }

    #[test]
    fn test_skipped_minute_never_fires() {
        let mut r = rig(at(8, 59, 59), Config::default());
        r.engine.handle_command(Command::AddAlarm(time(9, 0)));
        let id = r.engine.registry.view()[0].id;

        r.engine.handle_tick();
        // The clock jumps clean over 09:00; hour:minute equality never
        // holds, so the alarm never fires. Accepted limitation.
        r.clock.set(at(9, 1, 0));
        r.engine.handle_tick();
        r.clock.set(at(9, 2, 0));
        r.engine.handle_tick();

        assert_eq!(r.audio.log.lock().plays, 0);
        assert_eq!(r.engine.registry.get(id).unwrap().state, AlarmState::Scheduled);
    }

    #[test]
    fn test_snooze_round_trip_through_commands() {
        let mut r = rig(at(9, 59, 59), Config::default());
        r.engine.handle_command(Command::AddAlarm(time(10, 0)));
        let id = r.engine.registry.view()[0].id;

        r.clock.set(at(10, 0, 0));
        r.engine.handle_tick();
        assert!(r.engine.registry.get(id).unwrap().is_ringing());

        let mut events = r.bus.subscribe_events();
        r.clock.set(at(10, 0, 20));
        r.engine.handle_command(Command::Snooze(id));

        assert_eq!(r.engine.registry.len(), 2);
        assert!(!r.engine.registry.get(id).unwrap().is_ringing());
        let replacement = r.engine.registry.view()[1];
        assert_eq!(replacement.time, time(10, 5));
        assert_eq!(r.audio.log.lock().stops, 1);

        let notifications = drain(&mut events);
        assert!(notifications
            .iter()
            .any(|n| matches!(n, Notification::AlarmSnoozed { original, .. } if *original == id)));

        // The original stays at 10:00 but is spent; the replacement rings
        // at 10:05.
        r.clock.set(at(10, 5, 0));
        r.engine.handle_tick();
        assert!(r.engine.registry.get(replacement.id).unwrap().is_ringing());
        assert!(!r.engine.registry.get(id).unwrap().is_ringing());
    }

    #[test]
    fn test_delete_is_total_at_engine_level() {
        let mut r = rig(at(8, 0, 0), Config::default());
        r.engine.handle_command(Command::AddAlarm(time(9, 0)));
        let id = r.engine.registry.view()[0].id;
        r.engine.handle_command(Command::DeleteAlarm(id));

        r.clock.set(at(9, 0, 0));
        r.engine.handle_tick();
        assert_eq!(r.audio.log.lock().plays, 0);

        let snapshot = r.engine.snapshot.read();
        assert!(snapshot.alarms.is_empty());
    }

    #[test]
    fn test_invalid_config_write_keeps_prior_and_notifies() {
        let mut r = rig(at(8, 0, 0), Config::default());
        let mut events = r.bus.subscribe_events();

        r.engine.handle_command(Command::SetSensitivity(25.0));
        assert_eq!(r.engine.config.monitor.sensitivity_threshold, 10.0);

        r.engine.handle_command(Command::SetOffsetMinutes(0));
        assert_eq!(r.engine.config.alarm.offset_minutes, 5);

        let notifications = drain(&mut events);
        let warnings = notifications
            .iter()
            .filter(|n| {
                matches!(
                    n,
                    Notification::Notice {
                        level: NoticeLevel::Warning,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(warnings, 2);
    }

    #[test]
    fn test_unknown_ids_are_advisory_not_fatal() {
        let mut r = rig(at(8, 0, 0), Config::default());
        let mut events = r.bus.subscribe_events();

        r.engine.handle_command(Command::StopAlarm(42));
        r.engine.handle_command(Command::Snooze(42));
        r.engine.handle_command(Command::DeleteAlarm(42));

        assert!(r.engine.registry.is_empty());
        assert_eq!(drain(&mut events).len(), 3);
    }

    #[test]
    fn test_audio_failure_leaves_ringing_state_intact() {
        let mut r = rig(at(8, 59, 59), Config::default());
        r.audio.log.lock().fail = true;
        r.engine.handle_command(Command::AddAlarm(time(9, 0)));
        let id = r.engine.registry.view()[0].id;

        r.clock.set(at(9, 0, 0));
        r.engine.handle_tick();

        // Playback failed, but the alarm rings and can still be stopped.
        assert!(r.engine.registry.get(id).unwrap().is_ringing());
        r.engine.handle_command(Command::StopAlarm(id));
        assert!(!r.engine.registry.get(id).unwrap().is_ringing());
    }

    #[test]
    fn test_inactivity_creates_one_offset_alarm_and_stops_monitoring() {
        let mut config = Config::default();
        config.alarm.offset_minutes = 5;
        let mut r = rig(at(10, 0, 0), config);

        r.engine.handle_command(Command::ToggleMonitoring);
        assert!(r.engine.session.is_active());

        // 300 quiet seconds, no Idle-confirmed resets.
        for s in 1..=299 {
            r.clock.set(at(10, 0, 0) + ChronoDuration::seconds(s));
            r.engine.handle_tick();
        }
        assert!(r.engine.registry.is_empty());

        r.clock.set(at(10, 5, 0));
        r.engine.handle_tick();

        let offsets: Vec<_> = r
            .engine
            .registry
            .view()
            .iter()
            .map(|v| (v.time, v.state))
            .collect();
        assert_eq!(offsets, vec![(time(10, 5), AlarmState::Ringing)]);
        assert!(!r.engine.session.is_active(), "monitoring auto-stops");
    }

    #[test]
    fn test_sudden_movement_scenario() {
        // Full walk: offset 1 min, start 10:00:00, jolt at 10:00:10,
        // quiet confirmed just after 10:00:12, countdown elapses at
        // ~10:01:12 into a 10:01 offset alarm.
        let mut config = Config::default();
        config.alarm.offset_minutes = 1;
        let mut r = rig(at(10, 0, 0), config);
        r.engine.handle_command(Command::ToggleMonitoring);

        let ms = ChronoDuration::milliseconds;
        let quiet = |t: DateTime<Utc>| MotionSample::new(0.0, 0.0, 9.81, t);

        r.clock.set(at(10, 0, 5));
        r.engine.handle_sample(quiet(at(10, 0, 5)));

        // Jolt: immediate Motion alarm, classification forced to Moving.
        r.clock.set(at(10, 0, 10));
        r.engine.handle_sample(MotionSample::new(3.0, 0.0, 9.81, at(10, 0, 10)));
        let motion_id = {
            let view = r.engine.registry.view();
            assert_eq!(view.len(), 1);
            assert_eq!(view[0].state, AlarmState::Ringing);
            assert_eq!(view[0].time, time(10, 0));
            view[0].id
        };
        assert_eq!(r.engine.session.movement_state(), MovementState::Moving);

        // Settling sample still carries a big delta; with the motion alarm
        // already sounding it must not spawn another record.
        r.clock.set(at(10, 0, 10) + ms(100));
        r.engine.handle_sample(quiet(at(10, 0, 10) + ms(100)));
        assert_eq!(r.engine.registry.len(), 1);

        // Clean quiet run; dwell confirms Idle two seconds after the first
        // clean sample and restarts the countdown from there.
        r.engine.handle_sample(quiet(at(10, 0, 10) + ms(200)));
        r.clock.set(at(10, 0, 12) + ms(200));
        r.engine.handle_sample(quiet(at(10, 0, 12) + ms(200)));
        assert_eq!(r.engine.session.movement_state(), MovementState::Idle);

        // The user silences the motion alarm meanwhile.
        r.clock.set(at(10, 0, 20));
        r.engine.handle_command(Command::StopAlarm(motion_id));

        // Countdown elapses; the offset alarm lands on 10:01 and rings on
        // the very tick that created it.
        r.clock.set(at(10, 1, 12) + ms(500));
        r.engine.handle_tick();

        assert!(!r.engine.session.is_active());
        let offset: Vec<_> = r
            .engine
            .registry
            .view()
            .iter()
            .filter(|v| v.id != motion_id)
            .copied()
            .collect();
        assert_eq!(offset.len(), 1, "exactly one offset alarm");
        assert_eq!(offset[0].time, time(10, 1));
        assert_eq!(offset[0].state, AlarmState::Ringing);
    }

    #[test]
    fn test_offset_change_rearms_live_countdown() {
        let mut r = rig(at(10, 0, 0), Config::default());
        r.engine.handle_command(Command::ToggleMonitoring);

        // Two minutes in, shorten the offset from five minutes to one. The
        // countdown restarts in full from the change.
        r.clock.set(at(10, 2, 0));
        r.engine.handle_command(Command::SetOffsetMinutes(1));

        r.clock.set(at(10, 2, 59));
        r.engine.handle_tick();
        assert!(r.engine.registry.is_empty());

        r.clock.set(at(10, 3, 0));
        r.engine.handle_tick();
        assert_eq!(r.engine.registry.len(), 1);
    }

    #[test]
    fn test_snapshot_tracks_the_world() {
        let mut r = rig(at(10, 0, 0), Config::default());
        r.engine.handle_command(Command::ToggleMonitoring);
        r.engine.handle_sample(MotionSample::new(0.0, 0.0, 9.81, at(10, 0, 1)));
        r.engine.handle_command(Command::AddAlarm(time(12, 30)));

        let snapshot = r.engine.snapshot.read().clone();
        assert!(snapshot.monitoring);
        assert_eq!(snapshot.samples.len(), 1);
        assert!((snapshot.current_magnitude - 9.81).abs() < 1e-9);
        assert_eq!(snapshot.alarms.len(), 1);
        assert_eq!(snapshot.alarms[0].time, time(12, 30));
    }
}

// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alertwave-rs

//! Event bus for collaborator notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::alarm::AlarmView;
use crate::motion::MotionSample;

/// Severity of an advisory notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// Notifications published for collaborators. Advisory only - no ack is
/// expected, and a slow subscriber never stalls the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    MovementStarted,
    MovementEnded,
    AlarmAdded(AlarmView),
    AlarmRinging(AlarmView),
    AlarmSnoozed { original: u64, replacement: AlarmView },
    AlarmDeleted(u64),
    /// Surfaced in place of the original app's toast popups.
    Notice { level: NoticeLevel, message: String },
}

/// Generic event wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub notification: Notification,
}

/// Central event bus for pub/sub communication
pub struct EventBus {
    sample_tx: broadcast::Sender<MotionSample>,
    event_tx: broadcast::Sender<Event>,
    event_counter: std::sync::atomic::AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sample_tx, _) = broadcast::channel(capacity);
        let (event_tx, _) = broadcast::channel(capacity);

        Self {
            sample_tx,
            event_tx,
            event_counter: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Fan a raw sample out to charting collaborators.
    pub fn publish_sample(&self, sample: MotionSample) {
        let _ = self.sample_tx.send(sample);
    }

    pub fn publish(&self, notification: Notification) {
        let id = self
            .event_counter
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let event = Event {
            id,
            timestamp: Utc::now(),
            notification,
        };
        let _ = self.event_tx.send(event);
    }

    pub fn notice(&self, level: NoticeLevel, message: &str) {
        self.publish(Notification::Notice {
            level,
            message: message.to_string(),
        });
    }

    pub fn subscribe_samples(&self) -> broadcast::Receiver<MotionSample> {
        self.sample_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }
}

//! Core module - the serialized engine loop and its collaborator taps

mod clock;
mod engine;
mod event_bus;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{ClockEngine, Command, EngineHandle, Snapshot};
pub use event_bus::{Event, EventBus, Notification, NoticeLevel};

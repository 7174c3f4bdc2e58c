use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EventError, EventResult};

/// Longest accepted event name, in bytes
pub const MAX_NAME_LEN: usize = 256;

/// Identity of a connected sender. Zero means "not assigned yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenderId(u64);

impl SenderId {
    pub const UNASSIGNED: SenderId = SenderId(0);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_unassigned(self) -> bool {
        self.0 == 0
    }

    /// Durable queue holding this sender's notifications
    pub fn queue_name(self) -> String {
        format!("sender-{}", self.0)
    }

    /// Binding between the exchange and [`Self::queue_name`]
    pub fn routing_key(self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pending event. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub sender_id: SenderId,
    pub fire_time: DateTime<Utc>,
    pub name: String,
}

impl Event {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.fire_time <= now
    }

    /// Time left until the event fires; `None` once it is due
    pub fn time_to_fire(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.fire_time - now)
            .to_std()
            .ok()
            .filter(|remaining| !remaining.is_zero())
    }

    /// Strictly inside `(from, to)`
    pub fn fires_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        from < self.fire_time && self.fire_time < to
    }
}

/// Input for creating an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub sender_id: SenderId,
    pub fire_time: DateTime<Utc>,
    pub name: String,
}

impl NewEvent {
    pub fn new(sender_id: SenderId, fire_time: DateTime<Utc>, name: impl Into<String>) -> Self {
        Self {
            sender_id,
            fire_time,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> EventResult<()> {
        if self.sender_id.is_unassigned() {
            return Err(EventError::Validation(
                "sender id 0 is reserved; register with GreetSender first".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(EventError::Validation("event name must not be empty".to_string()));
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(EventError::Validation(format!(
                "event name is {} bytes, the limit is {}",
                self.name.len(),
                MAX_NAME_LEN
            )));
        }
        Ok(())
    }

    pub(crate) fn into_event(self, id: EventId) -> Event {
        Event {
            id,
            sender_id: self.sender_id,
            fire_time: self.fire_time,
            name: self.name,
        }
    }
}

/// Why a notification was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Sent right after creation, expires when the event fires
    Announced,
    /// Sent by the scheduler once the fire time passed
    Fired,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Announced => "announced",
            NotificationKind::Fired => "fired",
        }
    }
}

/// JSON body published to a sender's queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventNotification {
    #[serde(rename = "eventID")]
    pub event_id: EventId,
    #[serde(rename = "senderID")]
    pub sender_id: SenderId,
    /// Unix seconds
    pub time: i64,
    pub name: String,
}

impl From<&Event> for EventNotification {
    fn from(event: &Event) -> Self {
        Self {
            event_id: event.id,
            sender_id: event.sender_id,
            time: event.fire_time.timestamp(),
            name: event.name.clone(),
        }
    }
}

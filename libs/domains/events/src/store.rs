//! In-memory registry of pending events.
//!
//! One `std::sync::Mutex` guards the event map and both id counters. Every
//! critical section is synchronous, so no lock is ever held across an
//! `.await` and a cancelled request cannot leave the map half-updated.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::{EventError, EventResult};
use crate::identity::IdentityAssigner;
use crate::models::{Event, EventId, NewEvent, SenderId};

#[derive(Debug, Default)]
struct Registry {
    events: HashMap<EventId, Event>,
    ids: IdentityAssigner,
}

#[derive(Debug, Default)]
pub struct EventStore {
    registry: Mutex<Registry>,
    max_pending: Option<usize>,
    /// Pending count that triggers the one-off 90% warning
    warn_at: Option<usize>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject creates once `limit` events are pending (`None` = unbounded)
    pub fn with_capacity_limit(limit: Option<usize>) -> Self {
        Self {
            registry: Mutex::default(),
            max_pending: limit,
            // ceil(0.9 * limit) without overflowing near usize::MAX
            warn_at: limit.map(|limit| limit - limit / 10),
        }
    }

    pub fn capacity_limit(&self) -> Option<usize> {
        self.max_pending
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // critical sections touch at most one entry; poisoned state is still consistent
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Issue a fresh sender id
    pub fn issue_sender_id(&self) -> SenderId {
        self.lock().ids.issue_sender_id()
    }

    /// Fresh id for [`SenderId::UNASSIGNED`], the requested id otherwise.
    /// The flag says whether a new id was issued.
    pub fn resolve_sender(&self, requested: SenderId) -> (SenderId, bool) {
        self.lock().ids.resolve_sender(requested)
    }

    /// Allocate the next event id and insert in one step.
    pub fn create(&self, new_event: NewEvent) -> EventResult<Event> {
        let mut registry = self.lock();

        if let Some(limit) = self.max_pending {
            if registry.events.len() >= limit {
                return Err(EventError::CapacityExceeded { limit });
            }
        }

        let id = registry.ids.issue_event_id();
        let event = new_event.into_event(id);
        registry.events.insert(id, event.clone());

        if let (Some(limit), Some(warn_at)) = (self.max_pending, self.warn_at) {
            let pending = registry.events.len();
            if pending == warn_at {
                warn!(pending, limit, "Event registry is 90% full");
            }
        }

        Ok(event)
    }

    /// The event, if it exists and belongs to `sender_id`
    pub fn get(&self, sender_id: SenderId, event_id: EventId) -> EventResult<Event> {
        self.lock()
            .events
            .get(&event_id)
            .filter(|event| event.sender_id == sender_id)
            .cloned()
            .ok_or(EventError::NotFound(event_id))
    }

    /// Remove an event owned by `sender_id` and return it
    pub fn delete(&self, sender_id: SenderId, event_id: EventId) -> EventResult<Event> {
        let mut registry = self.lock();
        match registry.events.get(&event_id) {
            Some(event) if event.sender_id == sender_id => registry
                .events
                .remove(&event_id)
                .ok_or(EventError::NotFound(event_id)),
            _ => Err(EventError::NotFound(event_id)),
        }
    }

    /// `sender_id`'s events firing strictly between `from` and `to`, in no
    /// particular order
    pub fn list_in_range(
        &self,
        sender_id: SenderId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Event> {
        self.lock()
            .events
            .values()
            .filter(|event| event.sender_id == sender_id && event.fires_between(from, to))
            .cloned()
            .collect()
    }

    /// Snapshot of every event due at `now`, oldest id first
    pub fn due(&self, now: DateTime<Utc>) -> Vec<Event> {
        let mut due: Vec<Event> = self
            .lock()
            .events
            .values()
            .filter(|event| event.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|event| event.id);
        due
    }

    /// Evict regardless of owner. `None` if it is already gone.
    pub fn remove(&self, event_id: EventId) -> Option<Event> {
        self.lock().events.remove(&event_id)
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

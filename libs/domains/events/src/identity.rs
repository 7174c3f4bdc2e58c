//! Sender and event identifier issuance.

use crate::models::{EventId, SenderId};

/// Monotonic counters for sender and event ids.
///
/// Not synchronized on its own: it lives inside the [`EventStore`](crate::EventStore)
/// registry and is only touched under that lock, so id allocation and the
/// insert that uses it happen in one critical section.
#[derive(Debug)]
pub struct IdentityAssigner {
    last_sender_id: u64,
    next_event_id: u64,
}

impl Default for IdentityAssigner {
    fn default() -> Self {
        Self {
            last_sender_id: 0,
            next_event_id: 1,
        }
    }
}

impl IdentityAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a never-before-seen sender id; the first one is 1
    pub fn issue_sender_id(&mut self) -> SenderId {
        self.last_sender_id += 1;
        SenderId::new(self.last_sender_id)
    }

    /// Issue the next event id; the first one is 1
    pub fn issue_event_id(&mut self) -> EventId {
        let id = EventId::new(self.next_event_id);
        self.next_event_id += 1;
        id
    }

    /// What `registerSender` answers: fresh id for the sentinel, echo otherwise
    pub fn resolve_sender(&mut self, requested: SenderId) -> (SenderId, bool) {
        if requested.is_unassigned() {
            (self.issue_sender_id(), true)
        } else {
            (requested, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_one() {
        let mut ids = IdentityAssigner::new();
        assert_eq!(ids.issue_sender_id(), SenderId::new(1));
        assert_eq!(ids.issue_event_id(), EventId::new(1));
        assert_eq!(ids.issue_sender_id(), SenderId::new(2));
        assert_eq!(ids.issue_event_id(), EventId::new(2));
    }

    #[test]
    fn test_resolve_sender() {
        let mut ids = IdentityAssigner::new();

        assert_eq!(ids.resolve_sender(SenderId::UNASSIGNED), (SenderId::new(1), true));
        // returning identities are echoed and do not consume the counter
        assert_eq!(ids.resolve_sender(SenderId::new(99)), (SenderId::new(99), false));
        assert_eq!(ids.resolve_sender(SenderId::UNASSIGNED), (SenderId::new(2), true));
    }
}

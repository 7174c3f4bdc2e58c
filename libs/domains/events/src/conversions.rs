//! Conversions between protobuf types and domain types
//!
//! Request parsing returns `Result<_, String>` so handlers can answer
//! `INVALID_ARGUMENT` via `ToTonicResult::to_tonic`.

use chrono::{DateTime, Utc};
use grpc_client::conversions::{
    datetime_to_timestamp, id_to_wire, non_negative_id, timestamp_to_datetime,
};
use rpc::events::v1 as proto;

use crate::models::{Event, EventId, NewEvent, SenderId};

/// Addresses one event on behalf of its sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventRef {
    pub sender_id: SenderId,
    pub event_id: EventId,
}

/// Range query for `GetEvents`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub sender_id: SenderId,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

pub fn sender_from_wire(value: i64) -> Result<SenderId, String> {
    non_negative_id("sender_id", value).map(SenderId::new)
}

pub fn event_id_from_wire(value: i64) -> Result<EventId, String> {
    non_negative_id("event_id", value).map(EventId::new)
}

// ============================================================================
// Event
// ============================================================================

impl From<&Event> for proto::Event {
    fn from(event: &Event) -> Self {
        Self {
            event_id: id_to_wire(event.id.get()),
            sender_id: id_to_wire(event.sender_id.get()),
            time: datetime_to_timestamp(event.fire_time),
            name: event.name.clone(),
        }
    }
}

impl From<Event> for proto::Event {
    fn from(event: Event) -> Self {
        (&event).into()
    }
}

// ============================================================================
// Requests
// ============================================================================

impl TryFrom<proto::MakeEventRequest> for NewEvent {
    type Error = String;

    fn try_from(req: proto::MakeEventRequest) -> Result<Self, Self::Error> {
        Ok(NewEvent::new(
            sender_from_wire(req.sender_id)?,
            timestamp_to_datetime("time", req.time)?,
            req.name,
        ))
    }
}

impl TryFrom<proto::GetEventRequest> for EventRef {
    type Error = String;

    fn try_from(req: proto::GetEventRequest) -> Result<Self, Self::Error> {
        Ok(EventRef {
            sender_id: sender_from_wire(req.sender_id)?,
            event_id: event_id_from_wire(req.event_id)?,
        })
    }
}

impl TryFrom<proto::DeleteEventRequest> for EventRef {
    type Error = String;

    fn try_from(req: proto::DeleteEventRequest) -> Result<Self, Self::Error> {
        Ok(EventRef {
            sender_id: sender_from_wire(req.sender_id)?,
            event_id: event_id_from_wire(req.event_id)?,
        })
    }
}

impl TryFrom<proto::GetEventsRequest> for EventWindow {
    type Error = String;

    fn try_from(req: proto::GetEventsRequest) -> Result<Self, Self::Error> {
        Ok(EventWindow {
            sender_id: sender_from_wire(req.sender_id)?,
            from: timestamp_to_datetime("from_time", req.from_time)?,
            to: timestamp_to_datetime("to_time", req.to_time)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_to_proto() {
        let event = Event {
            id: EventId::new(3),
            sender_id: SenderId::new(7),
            fire_time: Utc.timestamp_opt(1_700_000_005, 0).unwrap(),
            name: "launch".to_string(),
        };

        let wire = proto::Event::from(&event);
        assert_eq!(wire.event_id, 3);
        assert_eq!(wire.sender_id, 7);
        assert_eq!(wire.time, 1_700_000_005);
        assert_eq!(wire.name, "launch");
    }

    #[test]
    fn test_make_event_request() {
        let new_event = NewEvent::try_from(proto::MakeEventRequest {
            sender_id: 7,
            time: 1_700_000_005,
            name: "launch".to_string(),
        })
        .unwrap();

        assert_eq!(new_event.sender_id, SenderId::new(7));
        assert_eq!(new_event.fire_time.timestamp(), 1_700_000_005);
    }

    #[test]
    fn test_negative_ids_rejected() {
        let err = EventRef::try_from(proto::GetEventRequest {
            sender_id: 1,
            event_id: -5,
        })
        .unwrap_err();
        assert!(err.contains("event_id"));

        let err = EventRef::try_from(proto::DeleteEventRequest {
            sender_id: -1,
            event_id: 5,
        })
        .unwrap_err();
        assert!(err.contains("sender_id"));
    }

    #[test]
    fn test_window_out_of_range_time() {
        let err = EventWindow::try_from(proto::GetEventsRequest {
            sender_id: 1,
            from_time: 0,
            to_time: i64::MAX,
        })
        .unwrap_err();
        assert!(err.starts_with("to_time"));
    }
}

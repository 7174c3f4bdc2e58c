use std::sync::Arc;

use chrono::{DateTime, Utc};
use messaging::OutboundMessage;
use observability::SchedulerMetrics;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::context::SchedulerContext;
use crate::error::{EventError, EventResult};
use crate::models::{Event, EventId, EventNotification, NewEvent, NotificationKind, SenderId};

/// Header carrying the event id on every published notification
pub const EVENT_ID_HEADER: &str = "Event-Id";
/// Header telling consumers whether a notification is an announcement or a firing
pub const NOTIFICATION_KIND_HEADER: &str = "Notification-Kind";

/// Build the broker message for `event`.
///
/// The message id is stable per event, kind and `instance`, so a re-publish
/// after a lost ack is de-duplicated by brokers that support it while an
/// event with a reused id from an earlier process is not.
pub fn notification_message(
    event: &Event,
    kind: NotificationKind,
    instance: Uuid,
) -> EventResult<OutboundMessage> {
    let message = OutboundMessage::json(
        event.sender_id.routing_key(),
        &EventNotification::from(event),
    )?
    .with_header(EVENT_ID_HEADER, event.id.to_string())
    .with_header(NOTIFICATION_KIND_HEADER, kind.as_str())
    .with_message_id(format!(
        "event-{}-{}-{}",
        event.id,
        kind.as_str(),
        instance.simple()
    ));
    Ok(message)
}

/// Request-side operations on the shared registry
#[derive(Clone)]
pub struct EventService {
    ctx: Arc<SchedulerContext>,
}

impl EventService {
    pub fn new(ctx: Arc<SchedulerContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<SchedulerContext> {
        &self.ctx
    }

    /// Issue an id for [`SenderId::UNASSIGNED`], echo any other id back.
    ///
    /// A freshly issued sender gets its queue declared before the id is
    /// returned. Returning senders are taken at their word.
    #[instrument(skip(self), fields(requested = %requested))]
    pub async fn register_sender(&self, requested: SenderId) -> EventResult<SenderId> {
        let (sender_id, fresh) = self.ctx.store.resolve_sender(requested);

        if fresh {
            self.ctx.topology.ensure_sender(sender_id).await?;
            info!(sender_id = %sender_id, "Issued new sender id");
        } else {
            debug!(sender_id = %sender_id, "Returning sender");
        }

        SchedulerMetrics::record_sender_registered(fresh);
        Ok(sender_id)
    }

    #[instrument(skip(self, input), fields(sender_id = %input.sender_id, name = %input.name))]
    pub async fn create_event(&self, input: NewEvent) -> EventResult<Event> {
        input.validate()?;

        // returning senders may never have been declared by this process
        self.ctx.topology.ensure_sender(input.sender_id).await?;

        let event = match self.ctx.store.create(input) {
            Ok(event) => event,
            Err(err @ EventError::CapacityExceeded { .. }) => {
                SchedulerMetrics::record_capacity_rejected();
                warn!(error = %err, "Event rejected");
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        SchedulerMetrics::record_event_created();
        SchedulerMetrics::set_pending_events(self.ctx.store.len());
        info!(
            event_id = %event.id,
            fire_time = %event.fire_time,
            "Event scheduled"
        );

        if self.ctx.config.announce_on_create {
            self.announce(&event, Utc::now()).await;
        }

        Ok(event)
    }

    /// Publish an announcement that expires when the event fires.
    ///
    /// Failures are only logged: the event is stored and will still fire.
    async fn announce(&self, event: &Event, now: DateTime<Utc>) {
        let Some(ttl) = event.time_to_fire(now) else {
            debug!(event_id = %event.id, "Event already due, skipping announcement");
            return;
        };

        let result = match notification_message(event, NotificationKind::Announced, self.ctx.instance_id) {
            Ok(message) => self
                .ctx
                .broker
                .publish(message.with_ttl(ttl))
                .await
                .map_err(EventError::from),
            Err(err) => Err(err),
        };

        if let Err(err) = result {
            SchedulerMetrics::record_publish_failure(NotificationKind::Announced.as_str());
            warn!(event_id = %event.id, error = %err, "Failed to announce event");
        }
    }

    #[instrument(skip(self), fields(sender_id = %sender_id, event_id = %event_id))]
    pub async fn get_event(&self, sender_id: SenderId, event_id: EventId) -> EventResult<Event> {
        self.ctx.store.get(sender_id, event_id)
    }

    /// Returns a confirmation line for the caller
    #[instrument(skip(self), fields(sender_id = %sender_id, event_id = %event_id))]
    pub async fn delete_event(&self, sender_id: SenderId, event_id: EventId) -> EventResult<String> {
        let event = self.ctx.store.delete(sender_id, event_id)?;

        SchedulerMetrics::record_event_deleted();
        SchedulerMetrics::set_pending_events(self.ctx.store.len());
        info!(name = %event.name, "Event deleted");

        Ok(format!("Event {} deleted", event.id))
    }

    /// Events firing strictly between `from` and `to`, by ascending id
    #[instrument(skip(self), fields(sender_id = %sender_id))]
    pub async fn list_events(
        &self,
        sender_id: SenderId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Event> {
        if from >= to {
            return Vec::new();
        }

        let mut events = self.ctx.store.list_in_range(sender_id, from, to);
        events.sort_by_key(|event| event.id);
        debug!(count = events.len(), "Listed events");
        events
    }

    /// Pending events stay scheduled; only a farewell is returned
    #[instrument(skip(self), fields(sender_id = %sender_id))]
    pub async fn disconnect(&self, sender_id: SenderId) -> String {
        info!("Sender disconnected");
        format!("Goodbye, sender {}!", sender_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use chrono::{Duration, TimeZone};
    use messaging::{BrokerError, InMemoryBroker, MockBroker};

    async fn service_with(config: SchedulerConfig) -> (EventService, Arc<InMemoryBroker>) {
        let broker = Arc::new(InMemoryBroker::new());
        let ctx = SchedulerContext::new(broker.clone(), config);
        ctx.init().await.unwrap();
        (EventService::new(ctx), broker)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_register_issues_ids_and_declares_queue() {
        let (service, broker) = service_with(SchedulerConfig::default()).await;

        let first = service.register_sender(SenderId::UNASSIGNED).await.unwrap();
        let second = service.register_sender(SenderId::UNASSIGNED).await.unwrap();

        assert_eq!(first, SenderId::new(1));
        assert_eq!(second, SenderId::new(2));
        assert!(broker.has_queue("sender-1"));
        assert_eq!(broker.bindings().get("sender-2").map(String::as_str), Some("2"));
    }

    #[tokio::test]
    async fn test_register_returning_sender_is_echoed_without_topology() {
        let (service, broker) = service_with(SchedulerConfig::default()).await;

        let id = service.register_sender(SenderId::new(42)).await.unwrap();

        assert_eq!(id, SenderId::new(42));
        assert!(!broker.has_queue("sender-42"));
    }

    #[tokio::test]
    async fn test_register_fails_when_topology_fails() {
        let (service, broker) = service_with(SchedulerConfig::default()).await;
        broker.set_fail_declare(true);

        let err = service.register_sender(SenderId::UNASSIGNED).await.unwrap_err();
        assert!(matches!(err, EventError::BrokerUnavailable(_)));
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let (service, _) = service_with(SchedulerConfig::default()).await;
        let sender = SenderId::new(7);
        let fire = Utc::now() + Duration::hours(1);

        let event = service
            .create_event(NewEvent::new(sender, fire, "launch"))
            .await
            .unwrap();
        assert_eq!(event.id, EventId::new(1));

        let fetched = service.get_event(sender, event.id).await.unwrap();
        assert_eq!(fetched, event);

        let confirmation = service.delete_event(sender, event.id).await.unwrap();
        assert_eq!(confirmation, "Event 1 deleted");

        let err = service.get_event(sender, event.id).await.unwrap_err();
        assert!(matches!(err, EventError::NotFound(id) if id == event.id));
    }

    #[tokio::test]
    async fn test_other_sender_cannot_see_or_delete() {
        let (service, _) = service_with(SchedulerConfig::default()).await;
        let event = service
            .create_event(NewEvent::new(SenderId::new(1), at(2_000_000_000), "mine"))
            .await
            .unwrap();

        let intruder = SenderId::new(2);
        assert!(matches!(
            service.get_event(intruder, event.id).await,
            Err(EventError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_event(intruder, event.id).await,
            Err(EventError::NotFound(_))
        ));
        assert!(service.get_event(SenderId::new(1), event.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_declares_returning_sender_and_announces() {
        let (service, broker) = service_with(SchedulerConfig::default()).await;
        let fire = Utc::now() + Duration::seconds(30);

        let event = service
            .create_event(NewEvent::new(SenderId::new(9), fire, "lunch"))
            .await
            .unwrap();

        assert!(broker.has_queue("sender-9"));
        let queued = broker.queue_messages("sender-9");
        assert_eq!(queued.len(), 1);

        let announcement = &queued[0];
        assert_eq!(announcement.header(EVENT_ID_HEADER), Some("1"));
        assert_eq!(announcement.header(NOTIFICATION_KIND_HEADER), Some("announced"));
        assert_eq!(
            announcement.message_id,
            Some(format!("event-1-announced-{}", service.context().instance_id.simple()))
        );
        let ttl = announcement.ttl.expect("announcement expires");
        assert!(ttl <= std::time::Duration::from_secs(30));

        let body: EventNotification = serde_json::from_slice(&announcement.payload).unwrap();
        assert_eq!(body, EventNotification::from(&event));
    }

    #[tokio::test]
    async fn test_no_announcement_for_past_event_or_when_disabled() {
        let (service, broker) = service_with(SchedulerConfig::default()).await;
        service
            .create_event(NewEvent::new(SenderId::new(3), at(0), "late"))
            .await
            .unwrap();
        assert!(broker.queue_messages("sender-3").is_empty());

        let (quiet, broker) =
            service_with(SchedulerConfig::default().with_announce_on_create(false)).await;
        quiet
            .create_event(NewEvent::new(SenderId::new(3), Utc::now() + Duration::hours(1), "x"))
            .await
            .unwrap();
        assert!(broker.published().is_empty());
    }

    #[tokio::test]
    async fn test_announcement_failure_keeps_event() {
        let (service, broker) = service_with(SchedulerConfig::default()).await;
        broker.set_fail_publish(true);

        let event = service
            .create_event(NewEvent::new(
                SenderId::new(4),
                Utc::now() + Duration::minutes(5),
                "retry",
            ))
            .await
            .unwrap();

        assert!(service.get_event(SenderId::new(4), event.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_fails_when_queue_cannot_be_declared() {
        let mut broker = MockBroker::new();
        broker.expect_declare_exchange().returning(|| Ok(()));
        broker
            .expect_declare_queue()
            .returning(|queue, _| Err(BrokerError::declare_queue(queue, "stream offline")));
        broker.expect_publish().never();

        let ctx = SchedulerContext::new(Arc::new(broker), SchedulerConfig::default());
        ctx.init().await.unwrap();
        let service = EventService::new(ctx);

        let err = service
            .create_event(NewEvent::new(SenderId::new(5), at(2_000_000_000), "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::BrokerUnavailable(_)));
        assert!(service.context().store.is_empty());
    }

    #[tokio::test]
    async fn test_validation_rejected_before_topology() {
        let (service, broker) = service_with(SchedulerConfig::default()).await;

        let err = service
            .create_event(NewEvent::new(SenderId::new(5), at(10), ""))
            .await
            .unwrap_err();

        assert!(matches!(err, EventError::Validation(_)));
        assert!(!broker.has_queue("sender-5"));
    }

    #[tokio::test]
    async fn test_capacity_limit() {
        let (service, _) = service_with(
            SchedulerConfig::default()
                .with_max_pending_events(2)
                .with_announce_on_create(false),
        )
        .await;
        let sender = SenderId::new(1);

        for name in ["a", "b"] {
            service
                .create_event(NewEvent::new(sender, at(2_000_000_000), name))
                .await
                .unwrap();
        }
        let err = service
            .create_event(NewEvent::new(sender, at(2_000_000_000), "c"))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::CapacityExceeded { limit: 2 }));

        service.delete_event(sender, EventId::new(1)).await.unwrap();
        assert!(
            service
                .create_event(NewEvent::new(sender, at(2_000_000_000), "c"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_list_events_open_interval_sorted() {
        let (service, _) =
            service_with(SchedulerConfig::default().with_announce_on_create(false)).await;
        let sender = SenderId::new(1);
        for (secs, name) in [(300, "c"), (100, "a"), (200, "b"), (400, "edge")] {
            service
                .create_event(NewEvent::new(sender, at(secs), name))
                .await
                .unwrap();
        }
        service
            .create_event(NewEvent::new(SenderId::new(2), at(150), "other"))
            .await
            .unwrap();

        let names: Vec<String> = service
            .list_events(sender, at(50), at(400))
            .await
            .into_iter()
            .map(|event| event.name)
            .collect();
        assert_eq!(names, ["c", "a", "b"]);

        assert!(service.list_events(sender, at(400), at(50)).await.is_empty());
        assert!(service.list_events(sender, at(100), at(100)).await.is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_farewell() {
        let (service, _) = service_with(SchedulerConfig::default()).await;
        assert_eq!(
            service.disconnect(SenderId::new(12)).await,
            "Goodbye, sender 12!"
        );
    }
}

//! Scheduler publishing through a real JetStream stream.
//!
//! Run with `cargo test -p domain_events -- --ignored` (needs Docker).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use domain_events::{
    EventNotification, EventService, NewEvent, Scheduler, SchedulerConfig, SchedulerContext,
    SenderId,
};
use messaging::nats::{ExchangeConfig, JetStreamBroker};
use test_utils::assertions::assert_some;
use test_utils::{TestDataBuilder, TestNats};

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_due_event_lands_in_sender_queue() {
    let nats = TestNats::new().await;
    let data = TestDataBuilder::from_test_name("test_due_event_lands_in_sender_queue");
    let sender = SenderId::new(data.sender_id() as u64);

    let broker = Arc::new(JetStreamBroker::new(
        nats.jetstream(),
        ExchangeConfig::default(),
    ));
    let ctx = SchedulerContext::new(
        broker.clone(),
        SchedulerConfig::default().with_announce_on_create(false),
    );
    ctx.init().await.unwrap();
    let service = EventService::new(Arc::clone(&ctx));

    assert_eq!(service.register_sender(sender).await.unwrap(), sender);
    let name = data.name("event", "due");
    let event = service
        .create_event(NewEvent::new(sender, Utc::now(), name.clone()))
        .await
        .unwrap();

    let report = Scheduler::new(Arc::clone(&ctx)).sweep_once(Utc::now()).await;
    assert_eq!(report.published, 1);
    assert!(ctx.store.is_empty());

    let mut listener = broker
        .subscribe(&sender.queue_name(), &sender.routing_key())
        .await
        .unwrap();
    let received = tokio::time::timeout(Duration::from_secs(5), listener.next::<EventNotification>())
        .await
        .expect("timed out waiting for notification");
    let notification = assert_some(received, "subscription ended").unwrap();

    assert_eq!(notification.event_id, event.id);
    assert_eq!(notification.sender_id, sender);
    assert_eq!(notification.name, name);
}

//! Drives the gRPC handlers through the generated trait against an
//! in-memory broker.

use std::sync::Arc;

use chrono::Utc;
use domain_events::{
    EventNotification, EventService, Scheduler, SchedulerConfig, SchedulerContext,
};
use messaging::InMemoryBroker;
use rpc::events::v1::{
    DeleteEventRequest, ExitRequest, GetEventRequest, GetEventsRequest, GreetSenderRequest,
    MakeEventRequest, event_manager_server::EventManager,
};
use scheduler_server::EventManagerService;
use tokio_stream::StreamExt;
use tonic::{Code, Request};

struct Harness {
    grpc: EventManagerService,
    ctx: Arc<SchedulerContext>,
    broker: Arc<InMemoryBroker>,
}

async fn harness(config: SchedulerConfig) -> Harness {
    let broker = Arc::new(InMemoryBroker::new());
    let ctx = SchedulerContext::new(broker.clone(), config);
    ctx.init().await.unwrap();
    Harness {
        grpc: EventManagerService::new(EventService::new(Arc::clone(&ctx))),
        ctx,
        broker,
    }
}

async fn make(grpc: &EventManagerService, sender_id: i64, time: i64, name: &str) -> i64 {
    grpc.make_event(Request::new(MakeEventRequest {
        sender_id,
        time,
        name: name.to_string(),
    }))
    .await
    .unwrap()
    .into_inner()
    .event_id
}

#[tokio::test]
async fn test_greet_sender_issues_and_echoes_ids() {
    let h = harness(SchedulerConfig::default()).await;

    let first = h
        .grpc
        .greet_sender(Request::new(GreetSenderRequest { sender_id: 0 }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(first.sender_id, 1);
    assert!(h.broker.has_queue("sender-1"));

    let returning = h
        .grpc
        .greet_sender(Request::new(GreetSenderRequest { sender_id: 77 }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(returning.sender_id, 77);
}

#[tokio::test]
async fn test_greet_sender_unavailable_when_broker_down() {
    let h = harness(SchedulerConfig::default()).await;
    h.broker.set_fail_declare(true);

    let status = h
        .grpc
        .greet_sender(Request::new(GreetSenderRequest { sender_id: 0 }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unavailable);
}

#[tokio::test]
async fn test_make_get_delete_roundtrip() {
    let h = harness(SchedulerConfig::default()).await;
    let fire = Utc::now().timestamp() + 3600;

    let event_id = make(&h.grpc, 7, fire, "launch").await;
    assert_eq!(event_id, 1);

    let event = h
        .grpc
        .get_event(Request::new(GetEventRequest {
            sender_id: 7,
            event_id,
        }))
        .await
        .unwrap()
        .into_inner()
        .event
        .unwrap();
    assert_eq!(event.sender_id, 7);
    assert_eq!(event.time, fire);
    assert_eq!(event.name, "launch");

    let deleted = h
        .grpc
        .delete_event(Request::new(DeleteEventRequest {
            sender_id: 7,
            event_id,
        }))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(deleted.delete_response, "Event 1 deleted");

    let status = h
        .grpc
        .get_event(Request::new(GetEventRequest {
            sender_id: 7,
            event_id,
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
}

#[tokio::test]
async fn test_wrong_sender_gets_not_found() {
    let h = harness(SchedulerConfig::default()).await;
    let event_id = make(&h.grpc, 1, 2_000_000_000, "private").await;

    let status = h
        .grpc
        .delete_event(Request::new(DeleteEventRequest {
            sender_id: 2,
            event_id,
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(h.ctx.store.len(), 1);
}

#[tokio::test]
async fn test_invalid_arguments() {
    let h = harness(SchedulerConfig::default()).await;

    let empty_name = h
        .grpc
        .make_event(Request::new(MakeEventRequest {
            sender_id: 1,
            time: 10,
            name: String::new(),
        }))
        .await
        .unwrap_err();
    assert_eq!(empty_name.code(), Code::InvalidArgument);

    let negative_id = h
        .grpc
        .get_event(Request::new(GetEventRequest {
            sender_id: 1,
            event_id: -1,
        }))
        .await
        .unwrap_err();
    assert_eq!(negative_id.code(), Code::InvalidArgument);

    let bad_time = h
        .grpc
        .make_event(Request::new(MakeEventRequest {
            sender_id: 1,
            time: i64::MAX,
            name: "never".to_string(),
        }))
        .await
        .unwrap_err();
    assert_eq!(bad_time.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn test_capacity_exhausted() {
    let h = harness(SchedulerConfig::default().with_max_pending_events(1)).await;
    make(&h.grpc, 1, 2_000_000_000, "first").await;

    let status = h
        .grpc
        .make_event(Request::new(MakeEventRequest {
            sender_id: 1,
            time: 2_000_000_000,
            name: "second".to_string(),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::ResourceExhausted);
}

#[tokio::test]
async fn test_get_events_streams_open_interval_in_id_order() {
    let h = harness(SchedulerConfig::default().with_announce_on_create(false)).await;
    make(&h.grpc, 3, 300, "c").await;
    make(&h.grpc, 3, 100, "a").await;
    make(&h.grpc, 3, 500, "outside").await;
    make(&h.grpc, 4, 200, "someone else").await;

    let stream = h
        .grpc
        .get_events(Request::new(GetEventsRequest {
            sender_id: 3,
            from_time: 100,
            to_time: 500,
        }))
        .await
        .unwrap()
        .into_inner();
    let names: Vec<String> = stream
        .map(|item| item.unwrap().event.unwrap().name)
        .collect()
        .await;
    assert_eq!(names, ["c"]);

    let stream = h
        .grpc
        .get_events(Request::new(GetEventsRequest {
            sender_id: 3,
            from_time: 0,
            to_time: 1_000,
        }))
        .await
        .unwrap()
        .into_inner();
    let ids: Vec<i64> = stream
        .map(|item| item.unwrap().event.unwrap().event_id)
        .collect()
        .await;
    assert_eq!(ids, [1, 2, 3]);
}

#[tokio::test]
async fn test_get_events_reversed_window_is_empty() {
    let h = harness(SchedulerConfig::default()).await;
    make(&h.grpc, 3, 300, "c").await;

    let stream = h
        .grpc
        .get_events(Request::new(GetEventsRequest {
            sender_id: 3,
            from_time: 1_000,
            to_time: 0,
        }))
        .await
        .unwrap()
        .into_inner();
    let items: Vec<_> = stream.collect().await;
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_exit_farewell() {
    let h = harness(SchedulerConfig::default()).await;
    let goodbye = h
        .grpc
        .exit(Request::new(ExitRequest { sender_id: 5 }))
        .await
        .unwrap()
        .into_inner()
        .goodbye;
    assert_eq!(goodbye, "Goodbye, sender 5!");
}

#[tokio::test]
async fn test_due_event_reaches_sender_queue() {
    let h = harness(SchedulerConfig::default().with_announce_on_create(false)).await;
    let sender_id = h
        .grpc
        .greet_sender(Request::new(GreetSenderRequest { sender_id: 0 }))
        .await
        .unwrap()
        .into_inner()
        .sender_id;

    let fire = Utc::now().timestamp() - 1;
    let event_id = make(&h.grpc, sender_id, fire, "standup").await;

    let report = Scheduler::new(Arc::clone(&h.ctx)).sweep_once(Utc::now()).await;
    assert_eq!(report.published, 1);

    let status = h
        .grpc
        .get_event(Request::new(GetEventRequest {
            sender_id,
            event_id,
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    let queued = h.broker.drain(&format!("sender-{}", sender_id));
    assert_eq!(queued.len(), 1);
    let body: EventNotification = serde_json::from_slice(&queued[0].payload).unwrap();
    assert_eq!(body.event_id.get(), event_id as u64);
    assert_eq!(body.time, fire);
    assert_eq!(body.name, "standup");
}

//! Console session against an in-process server.

use std::sync::Arc;

use domain_events::{EventService, SchedulerConfig, SchedulerContext};
use grpc_client::{create_channel, endpoint_url};
use messaging::InMemoryBroker;
use rpc::events::v1::event_manager_client::EventManagerClient;
use rpc::events::v1::event_manager_server::EventManagerServer;
use clap::Parser;
use scheduler_client::{Cli, Command, Outcome, Session, event_manager_client};
use scheduler_server::EventManagerService;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Channel, Server};

async fn serve_plain() -> Channel {
    let ctx = SchedulerContext::new(
        Arc::new(InMemoryBroker::new()),
        SchedulerConfig::default().with_announce_on_create(false),
    );
    ctx.init().await.unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let service = EventManagerServer::new(EventManagerService::new(EventService::new(ctx)));
    tokio::spawn(async move {
        Server::builder()
            .add_service(service)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    create_channel(endpoint_url("127.0.0.1", port)).await.unwrap()
}

async fn connect() -> EventManagerClient<Channel> {
    EventManagerClient::new(serve_plain().await)
}

fn lines(outcome: Outcome) -> Vec<String> {
    match outcome {
        Outcome::Continue(lines) => lines,
        Outcome::Exit(goodbye) => panic!("unexpected exit: {goodbye}"),
    }
}

async fn run(session: &mut Session, line: &str) -> Vec<String> {
    let command = Command::parse(line).unwrap().unwrap();
    lines(session.execute(command).await.unwrap())
}

#[tokio::test]
async fn test_full_console_session() {
    let mut session = Session::register(connect().await, 0).await.unwrap();
    assert_eq!(session.sender_id(), 1);

    assert_eq!(
        run(&mut session, "MakeEvent 1 2000000000 launch").await,
        ["Created{Event ID: 1}"]
    );
    assert_eq!(
        run(&mut session, "getevent 1 1").await,
        ["Event{sender_id:1, eventId:1, time:2000000000, name:launch}"]
    );
    assert_eq!(
        run(&mut session, "GetEvents 1 1999999999 2000000001").await,
        [
            "Events by 1 from 1999999999 to 2000000001:",
            "\tEvent{eventId:1, time:2000000000, name:launch}",
        ]
    );
    assert_eq!(run(&mut session, "DeleteEvent 1 1").await, ["Event 1 deleted"]);
    assert_eq!(
        run(&mut session, "GetEvent 1 1").await,
        ["Error getting event: Event 1 not found"]
    );
    assert_eq!(
        run(&mut session, "GetEvents 1 0 10").await,
        ["Events by 1 from 0 to 10:", "No events found."]
    );

    let farewell = session.execute(Command::Exit).await.unwrap();
    assert_eq!(farewell, Outcome::Exit("Goodbye, sender 1!".to_string()));
}

#[tokio::test]
async fn test_server_errors_are_printed_not_fatal() {
    let mut session = Session::register(connect().await, 9).await.unwrap();
    assert_eq!(session.sender_id(), 9);

    let output = run(&mut session, "MakeEvent 0 100 nobody").await;
    assert_eq!(output.len(), 1);
    assert!(output[0].starts_with("Could not make event:"));

    let output = run(&mut session, "DeleteEvent 9 -1").await;
    assert!(output[0].starts_with("Error deleting event: event_id must not be negative"));
}

#[tokio::test]
async fn test_default_client_works_without_server_compression() {
    let cli = temp_env::with_var_unset("SCHEDULER_COMPRESSION", || {
        Cli::parse_from(["scheduler-client"])
    });
    let client = event_manager_client(serve_plain().await, cli.compress);

    let mut session = Session::register(client, 0).await.unwrap();
    assert_eq!(session.sender_id(), 1);
    assert_eq!(
        run(&mut session, "MakeEvent 1 2000000000 quiet").await,
        ["Created{Event ID: 1}"]
    );
}

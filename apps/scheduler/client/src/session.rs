//! One registered sender talking to the scheduler.

use grpc_client::ToTonicOption;
use rpc::events::v1::event_manager_client::EventManagerClient;
use rpc::events::v1::{
    DeleteEventRequest, Event, ExitRequest, GetEventRequest, GetEventsRequest,
    GreetSenderRequest, MakeEventRequest,
};
use tonic::Status;
use tonic::transport::Channel;
use tracing::debug;

use crate::commands::Command;

/// What the console should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print these lines and read the next command
    Continue(Vec<String>),
    /// Print the farewell and stop
    Exit(String),
}

pub struct Session {
    client: EventManagerClient<Channel>,
    sender_id: i64,
}

impl Session {
    /// GreetSender with `requested` (0 = issue a new id).
    pub async fn register(
        mut client: EventManagerClient<Channel>,
        requested: i64,
    ) -> Result<Self, Status> {
        let sender_id = client
            .greet_sender(GreetSenderRequest {
                sender_id: requested,
            })
            .await?
            .into_inner()
            .sender_id;
        debug!(sender_id, "Registered");

        Ok(Self { client, sender_id })
    }

    pub fn sender_id(&self) -> i64 {
        self.sender_id
    }

    /// Run one command. RPC failures become printable lines, except for
    /// `Exit`, whose failure is returned.
    pub async fn execute(&mut self, command: Command) -> Result<Outcome, Status> {
        let lines = match command {
            Command::MakeEvent {
                sender_id,
                time,
                name,
            } => match self
                .client
                .make_event(MakeEventRequest {
                    sender_id,
                    time,
                    name,
                })
                .await
            {
                Ok(response) => vec![format_created(response.into_inner().event_id)],
                Err(status) => vec![format!("Could not make event: {}", status.message())],
            },
            Command::GetEvent {
                sender_id,
                event_id,
            } => match self.fetch(sender_id, event_id).await {
                Ok(event) => vec![format_event(&event)],
                Err(status) => vec![format!("Error getting event: {}", status.message())],
            },
            Command::DeleteEvent {
                sender_id,
                event_id,
            } => match self
                .client
                .delete_event(DeleteEventRequest {
                    sender_id,
                    event_id,
                })
                .await
            {
                Ok(response) => vec![response.into_inner().delete_response],
                Err(status) => vec![format!("Error deleting event: {}", status.message())],
            },
            Command::GetEvents {
                sender_id,
                from_time,
                to_time,
            } => self.list(sender_id, from_time, to_time).await,
            Command::Exit => {
                let goodbye = self
                    .client
                    .exit(ExitRequest {
                        sender_id: self.sender_id,
                    })
                    .await?
                    .into_inner()
                    .goodbye;
                return Ok(Outcome::Exit(goodbye));
            }
        };

        Ok(Outcome::Continue(lines))
    }

    async fn fetch(&mut self, sender_id: i64, event_id: i64) -> Result<Event, Status> {
        self.client
            .get_event(GetEventRequest {
                sender_id,
                event_id,
            })
            .await?
            .into_inner()
            .event
            .ok_or_not_found("Event not found")
    }

    async fn list(&mut self, sender_id: i64, from_time: i64, to_time: i64) -> Vec<String> {
        let mut stream = match self
            .client
            .get_events(GetEventsRequest {
                sender_id,
                from_time,
                to_time,
            })
            .await
        {
            Ok(response) => response.into_inner(),
            Err(status) => return vec![format!("Error getting events: {}", status.message())],
        };

        let mut lines = vec![format!(
            "Events by {} from {} to {}:",
            sender_id, from_time, to_time
        )];
        let mut found = 0;
        loop {
            match stream.message().await {
                Ok(Some(item)) => {
                    if let Some(event) = item.event {
                        lines.push(format_listed_event(&event));
                        found += 1;
                    }
                }
                Ok(None) => break,
                Err(status) => {
                    lines.push(format!("Error receiving events: {}", status.message()));
                    return lines;
                }
            }
        }
        if found == 0 {
            lines.push("No events found.".to_string());
        }
        lines
    }
}

pub fn format_created(event_id: i64) -> String {
    format!("Created{{Event ID: {}}}", event_id)
}

pub fn format_event(event: &Event) -> String {
    format!(
        "Event{{sender_id:{}, eventId:{}, time:{}, name:{}}}",
        event.sender_id, event.event_id, event.time, event.name
    )
}

pub fn format_listed_event(event: &Event) -> String {
    format!(
        "\tEvent{{eventId:{}, time:{}, name:{}}}",
        event.event_id, event.time, event.name
    )
}

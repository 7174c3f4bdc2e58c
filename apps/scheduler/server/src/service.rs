//! EventManager gRPC service implementation
//!
//! Handlers only convert: request parsing lives in
//! `domain_events::conversions`, behaviour in `EventService`.

use std::pin::Pin;

use domain_events::conversions::{EventRef, EventWindow, sender_from_wire};
use domain_events::{EventService, NewEvent};
use grpc_client::ToTonicResult;
use grpc_client::conversions::id_to_wire;
use rpc::events::v1::{
    DeleteEventRequest, DeleteEventResponse, ExitRequest, ExitResponse, GetEventRequest,
    GetEventResponse, GetEventsRequest, GetEventsResponse, GreetSenderRequest,
    GreetSenderResponse, MakeEventRequest, MakeEventResponse, event_manager_server::EventManager,
};
use tokio_stream::Stream;
use tonic::{Request, Response, Status};

/// Type alias for the GetEvents response stream
type EventStream = Pin<Box<dyn Stream<Item = Result<GetEventsResponse, Status>> + Send>>;

#[derive(Clone)]
pub struct EventManagerService {
    service: EventService,
}

impl EventManagerService {
    pub fn new(service: EventService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl EventManager for EventManagerService {
    async fn greet_sender(
        &self,
        request: Request<GreetSenderRequest>,
    ) -> Result<Response<GreetSenderResponse>, Status> {
        let requested = sender_from_wire(request.into_inner().sender_id).to_tonic()?;
        let sender_id = self.service.register_sender(requested).await?;

        Ok(Response::new(GreetSenderResponse {
            sender_id: id_to_wire(sender_id.get()),
        }))
    }

    async fn make_event(
        &self,
        request: Request<MakeEventRequest>,
    ) -> Result<Response<MakeEventResponse>, Status> {
        let input = NewEvent::try_from(request.into_inner()).to_tonic()?;
        let event = self.service.create_event(input).await?;

        Ok(Response::new(MakeEventResponse {
            event_id: id_to_wire(event.id.get()),
        }))
    }

    async fn get_event(
        &self,
        request: Request<GetEventRequest>,
    ) -> Result<Response<GetEventResponse>, Status> {
        let target = EventRef::try_from(request.into_inner()).to_tonic()?;
        let event = self
            .service
            .get_event(target.sender_id, target.event_id)
            .await?;

        Ok(Response::new(GetEventResponse {
            event: Some(event.into()),
        }))
    }

    async fn delete_event(
        &self,
        request: Request<DeleteEventRequest>,
    ) -> Result<Response<DeleteEventResponse>, Status> {
        let target = EventRef::try_from(request.into_inner()).to_tonic()?;
        let delete_response = self
            .service
            .delete_event(target.sender_id, target.event_id)
            .await?;

        Ok(Response::new(DeleteEventResponse { delete_response }))
    }

    type GetEventsStream = EventStream;

    async fn get_events(
        &self,
        request: Request<GetEventsRequest>,
    ) -> Result<Response<Self::GetEventsStream>, Status> {
        let window = EventWindow::try_from(request.into_inner()).to_tonic()?;
        let events = self
            .service
            .list_events(window.sender_id, window.from, window.to)
            .await;

        let stream = tokio_stream::iter(events.into_iter().map(|event| {
            Ok(GetEventsResponse {
                event: Some(event.into()),
            })
        }));

        Ok(Response::new(Box::pin(stream)))
    }

    async fn exit(&self, request: Request<ExitRequest>) -> Result<Response<ExitResponse>, Status> {
        let sender_id = sender_from_wire(request.into_inner().sender_id).to_tonic()?;
        let goodbye = self.service.disconnect(sender_id).await;

        Ok(Response::new(ExitResponse { goodbye }))
    }
}

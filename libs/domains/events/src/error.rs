use messaging::BrokerError;
use thiserror::Error;

use crate::models::EventId;

#[derive(Debug, Error)]
pub enum EventError {
    /// Missing, or owned by another sender. Callers cannot tell which.
    #[error("Event {0} not found")]
    NotFound(EventId),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Broker unavailable: {0}")]
    BrokerUnavailable(#[from] BrokerError),

    #[error("Too many pending events (limit {limit})")]
    CapacityExceeded { limit: usize },
}

pub type EventResult<T> = Result<T, EventError>;

impl From<EventError> for tonic::Status {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotFound(_) => tonic::Status::not_found(err.to_string()),
            EventError::Validation(msg) => tonic::Status::invalid_argument(msg),
            EventError::BrokerUnavailable(_) => tonic::Status::unavailable(err.to_string()),
            EventError::CapacityExceeded { .. } => {
                tonic::Status::resource_exhausted(err.to_string())
            }
        }
    }
}

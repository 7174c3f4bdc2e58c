//! Error types for broker operations.

use thiserror::Error;

/// Error that can occur while talking to the message broker.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Could not reach the broker at all
    #[error("broker connection error: {0}")]
    Connection(String),

    /// Declaring the exchange or a queue failed
    #[error("failed to declare {kind} '{name}': {message}")]
    Declare {
        kind: &'static str,
        name: String,
        message: String,
    },

    /// The broker did not accept (or acknowledge) a message
    #[error("publish to '{routing_key}' failed: {message}")]
    Publish {
        routing_key: String,
        message: String,
    },

    /// Receiving or acknowledging from a queue failed
    #[error("consumer error: {0}")]
    Consumer(String),

    /// Payload could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BrokerError {
    pub fn connection(error: impl std::fmt::Display) -> Self {
        Self::Connection(error.to_string())
    }

    pub fn declare_exchange(name: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Declare {
            kind: "exchange",
            name: name.into(),
            message: error.to_string(),
        }
    }

    pub fn declare_queue(name: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Declare {
            kind: "queue",
            name: name.into(),
            message: error.to_string(),
        }
    }

    pub fn publish(routing_key: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::Publish {
            routing_key: routing_key.into(),
            message: error.to_string(),
        }
    }

    pub fn consumer(error: impl std::fmt::Display) -> Self {
        Self::Consumer(error.to_string())
    }

    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            BrokerError::Connection(_) => "connection",
            BrokerError::Declare { .. } => "declare",
            BrokerError::Publish { .. } => "publish",
            BrokerError::Consumer(_) => "consumer",
            BrokerError::Serialization(_) => "serialization",
        }
    }
}

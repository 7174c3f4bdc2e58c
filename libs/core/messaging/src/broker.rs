//! Backend-agnostic broker seam.
//!
//! The model is the classic exchange/queue/routing-key one: a single shared
//! exchange, durable queues bound to it by routing key, and publishers that
//! address messages by routing key only.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::BrokerError;

/// A message ready to be handed to the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub routing_key: String,
    pub payload: Vec<u8>,
    pub headers: Vec<(String, String)>,
    /// Broker-side de-duplication key, when the backend supports one
    pub message_id: Option<String>,
    /// Discard the message if it has not been consumed within this time
    pub ttl: Option<Duration>,
    pub persistent: bool,
}

impl OutboundMessage {
    /// Persistent message with no expiry.
    pub fn new(routing_key: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            routing_key: routing_key.into(),
            payload,
            headers: Vec::new(),
            message_id: None,
            ttl: None,
            persistent: true,
        }
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize>(routing_key: impl Into<String>, body: &T) -> Result<Self, BrokerError> {
        Ok(Self::new(routing_key, serde_json::to_vec(body)?))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn transient(mut self) -> Self {
        self.persistent = false;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Exchange/queue topology plus publishing.
///
/// Every declaration is idempotent: declaring something that already exists
/// with the same shape succeeds.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Broker: Send + Sync {
    /// Declare the shared exchange every queue is bound to
    async fn declare_exchange(&self) -> Result<(), BrokerError>;

    /// Declare a durable queue and bind it to the exchange with `routing_key`
    async fn declare_queue(&self, queue: &str, routing_key: &str) -> Result<(), BrokerError>;

    /// Publish to the exchange; resolves once the broker has accepted the message
    async fn publish(&self, message: OutboundMessage) -> Result<(), BrokerError>;
}

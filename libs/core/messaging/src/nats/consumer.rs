//! Pull-based listener for one queue.

use async_nats::jetstream::consumer::pull::Stream as MessageStream;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::metrics::BrokerMetrics;
use crate::error::BrokerError;

/// Yields decoded messages from a durable consumer, acking each one.
pub struct QueueListener {
    messages: MessageStream,
    metrics: BrokerMetrics,
}

impl QueueListener {
    pub(crate) fn new(messages: MessageStream, metrics: BrokerMetrics) -> Self {
        Self { messages, metrics }
    }

    /// Wait for the next message and decode it as JSON.
    ///
    /// Returns `None` once the underlying subscription ends. A message that
    /// fails to decode is still acked so it is not redelivered forever.
    pub async fn next<T: DeserializeOwned>(&mut self) -> Option<Result<T, BrokerError>> {
        let message = match self.messages.next().await? {
            Ok(message) => message,
            Err(e) => return Some(Err(BrokerError::consumer(e))),
        };
        self.metrics.received();

        let decoded = serde_json::from_slice::<T>(&message.payload).map_err(BrokerError::from);

        if let Err(e) = message.ack().await {
            warn!(subject = %message.subject, error = %e, "Failed to ack message");
            return Some(Err(BrokerError::consumer(e)));
        }

        Some(decoded)
    }
}

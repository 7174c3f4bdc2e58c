//! In-process broker that routes like a direct exchange.
//!
//! Used by tests and by local runs without a NATS server. Messages published
//! to a routing key nobody is bound to are dropped, the same as an unroutable
//! message on a real exchange.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::broker::{Broker, OutboundMessage};
use crate::error::BrokerError;

#[derive(Debug, Default)]
struct State {
    exchange_declared: bool,
    /// queue name -> routing key
    bindings: BTreeMap<String, String>,
    /// queue name -> delivered messages, oldest first
    queues: BTreeMap<String, Vec<OutboundMessage>>,
    published: Vec<OutboundMessage>,
    fail_declare: bool,
    fail_publish: bool,
}

#[derive(Debug, Default)]
pub struct InMemoryBroker {
    state: Mutex<State>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // poisoned only after a panicking test; keep what was recorded
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every following declaration fail
    pub fn set_fail_declare(&self, fail: bool) {
        self.state().fail_declare = fail;
    }

    /// Make every following publish fail
    pub fn set_fail_publish(&self, fail: bool) {
        self.state().fail_publish = fail;
    }

    pub fn is_exchange_declared(&self) -> bool {
        self.state().exchange_declared
    }

    /// Declared queues with their routing keys
    pub fn bindings(&self) -> BTreeMap<String, String> {
        self.state().bindings.clone()
    }

    pub fn has_queue(&self, queue: &str) -> bool {
        self.state().bindings.contains_key(queue)
    }

    /// Every accepted publish, routable or not
    pub fn published(&self) -> Vec<OutboundMessage> {
        self.state().published.clone()
    }

    /// Messages waiting in `queue`
    pub fn queue_messages(&self, queue: &str) -> Vec<OutboundMessage> {
        self.state().queues.get(queue).cloned().unwrap_or_default()
    }

    /// Remove and return everything waiting in `queue`
    pub fn drain(&self, queue: &str) -> Vec<OutboundMessage> {
        self.state()
            .queues
            .get_mut(queue)
            .map(std::mem::take)
            .unwrap_or_default()
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn declare_exchange(&self) -> Result<(), BrokerError> {
        let mut state = self.state();
        if state.fail_declare {
            return Err(BrokerError::declare_exchange("memory", "declare disabled"));
        }
        state.exchange_declared = true;
        Ok(())
    }

    async fn declare_queue(&self, queue: &str, routing_key: &str) -> Result<(), BrokerError> {
        let mut state = self.state();
        if state.fail_declare {
            return Err(BrokerError::declare_queue(queue, "declare disabled"));
        }
        if !state.exchange_declared {
            return Err(BrokerError::declare_queue(queue, "exchange not declared"));
        }
        state
            .bindings
            .insert(queue.to_string(), routing_key.to_string());
        state.queues.entry(queue.to_string()).or_default();
        debug!(queue, routing_key, "Queue bound");
        Ok(())
    }

    async fn publish(&self, message: OutboundMessage) -> Result<(), BrokerError> {
        let mut state = self.state();
        if state.fail_publish {
            return Err(BrokerError::publish(&message.routing_key, "publish disabled"));
        }

        let targets: Vec<String> = state
            .bindings
            .iter()
            .filter(|(_, key)| **key == message.routing_key)
            .map(|(queue, _)| queue.clone())
            .collect();

        for queue in &targets {
            state
                .queues
                .entry(queue.clone())
                .or_default()
                .push(message.clone());
        }
        debug!(
            routing_key = %message.routing_key,
            queues = targets.len(),
            "Message routed"
        );
        state.published.push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_requires_exchange() {
        let broker = InMemoryBroker::new();
        let err = broker.declare_queue("sender-1", "1").await.unwrap_err();
        assert!(err.to_string().contains("exchange not declared"));
    }

    #[tokio::test]
    async fn test_routes_by_key_and_drops_unroutable() {
        let broker = InMemoryBroker::new();
        broker.declare_exchange().await.unwrap();
        broker.declare_queue("sender-1", "1").await.unwrap();
        broker.declare_queue("sender-2", "2").await.unwrap();

        broker
            .publish(OutboundMessage::new("1", b"a".to_vec()))
            .await
            .unwrap();
        broker
            .publish(OutboundMessage::new("3", b"b".to_vec()))
            .await
            .unwrap();

        assert_eq!(broker.queue_messages("sender-1").len(), 1);
        assert!(broker.queue_messages("sender-2").is_empty());
        assert_eq!(broker.published().len(), 2);
    }

    #[tokio::test]
    async fn test_redeclare_is_idempotent() {
        let broker = InMemoryBroker::new();
        broker.declare_exchange().await.unwrap();
        broker.declare_queue("sender-4", "4").await.unwrap();
        broker
            .publish(OutboundMessage::new("4", Vec::new()))
            .await
            .unwrap();
        broker.declare_queue("sender-4", "4").await.unwrap();

        assert_eq!(broker.bindings().len(), 1);
        assert_eq!(broker.queue_messages("sender-4").len(), 1);
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let broker = InMemoryBroker::new();
        broker.declare_exchange().await.unwrap();

        broker.set_fail_declare(true);
        assert!(broker.declare_queue("sender-1", "1").await.is_err());
        broker.set_fail_declare(false);
        broker.declare_queue("sender-1", "1").await.unwrap();

        broker.set_fail_publish(true);
        assert!(broker
            .publish(OutboundMessage::new("1", Vec::new()))
            .await
            .is_err());
        assert!(broker.published().is_empty());
    }

    #[tokio::test]
    async fn test_drain_empties_queue() {
        let broker = InMemoryBroker::new();
        broker.declare_exchange().await.unwrap();
        broker.declare_queue("sender-5", "5").await.unwrap();
        broker
            .publish(OutboundMessage::new("5", Vec::new()))
            .await
            .unwrap();

        assert_eq!(broker.drain("sender-5").len(), 1);
        assert!(broker.queue_messages("sender-5").is_empty());
    }
}

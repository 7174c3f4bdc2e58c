//! Prometheus metrics for the JetStream backend.

use metrics::counter;

/// Counters labelled with the stream they belong to.
#[derive(Clone, Debug)]
pub struct BrokerMetrics {
    stream_name: String,
}

impl BrokerMetrics {
    pub fn new(stream_name: &str) -> Self {
        Self {
            stream_name: stream_name.to_string(),
        }
    }

    pub fn published(&self) {
        counter!(
            "messaging_messages_published_total",
            "stream" => self.stream_name.clone()
        )
        .increment(1);
    }

    /// The stream already held a message with the same `Nats-Msg-Id`
    pub fn duplicate(&self) {
        counter!(
            "messaging_duplicates_total",
            "stream" => self.stream_name.clone()
        )
        .increment(1);
    }

    pub fn publish_failed(&self) {
        counter!(
            "messaging_publish_failures_total",
            "stream" => self.stream_name.clone()
        )
        .increment(1);
    }

    /// `kind` is `exchange` or `queue`
    pub fn declared(&self, kind: &'static str) {
        counter!(
            "messaging_declarations_total",
            "stream" => self.stream_name.clone(),
            "kind" => kind
        )
        .increment(1);
    }

    pub fn received(&self) {
        counter!(
            "messaging_messages_received_total",
            "stream" => self.stream_name.clone()
        )
        .increment(1);
    }
}

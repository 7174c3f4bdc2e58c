//! JetStream implementation of [`Broker`].

use async_nats::jetstream::consumer::pull::Config as ConsumerConfig;
use async_nats::jetstream::consumer::{AckPolicy, Consumer};
use async_nats::jetstream::stream::{Config as StreamConfig, StorageType};
use async_nats::jetstream::Context;
use async_nats::HeaderMap;
use async_trait::async_trait;
use core_config::NatsConfig;
use tracing::{debug, info, instrument, warn};

use super::config::ExchangeConfig;
use super::consumer::QueueListener;
use super::metrics::BrokerMetrics;
use crate::broker::{Broker, OutboundMessage};
use crate::error::BrokerError;

pub const MESSAGE_ID_HEADER: &str = "Nats-Msg-Id";
pub const MESSAGE_TTL_HEADER: &str = "Nats-TTL";

/// Exchange = stream, queue = durable pull consumer, routing key = subject suffix.
#[derive(Clone)]
pub struct JetStreamBroker {
    jetstream: Context,
    config: ExchangeConfig,
    metrics: BrokerMetrics,
}

impl JetStreamBroker {
    pub fn new(jetstream: Context, config: ExchangeConfig) -> Self {
        let metrics = BrokerMetrics::new(&config.stream_name);
        Self {
            jetstream,
            config,
            metrics,
        }
    }

    /// Connect to the server described by `nats` and wrap it in a JetStream context.
    pub async fn connect(nats: &NatsConfig, config: ExchangeConfig) -> Result<Self, BrokerError> {
        let client = async_nats::ConnectOptions::new()
            .name(&nats.connection_name)
            .connect(nats.url.as_str())
            .await
            .map_err(BrokerError::connection)?;

        info!(
            url = %nats.url,
            connection_name = %nats.connection_name,
            "Connected to NATS"
        );

        Ok(Self::new(async_nats::jetstream::new(client), config))
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    async fn ensure_consumer(
        &self,
        queue: &str,
        routing_key: &str,
    ) -> Result<Consumer<ConsumerConfig>, BrokerError> {
        let stream = self
            .jetstream
            .get_stream(&self.config.stream_name)
            .await
            .map_err(|e| BrokerError::declare_queue(queue, e))?;

        match stream.get_consumer::<ConsumerConfig>(queue).await {
            Ok(consumer) => {
                debug!(queue, "Queue already exists");
                Ok(consumer)
            }
            Err(_) => {
                let filter_subject = self.config.subject_for(routing_key);
                info!(
                    queue,
                    stream = %self.config.stream_name,
                    filter_subject = %filter_subject,
                    "Creating queue"
                );

                let consumer = stream
                    .create_consumer(ConsumerConfig {
                        durable_name: Some(queue.to_string()),
                        filter_subject,
                        ack_policy: AckPolicy::Explicit,
                        ..Default::default()
                    })
                    .await
                    .map_err(|e| BrokerError::declare_queue(queue, e))?;

                self.metrics.declared("queue");
                Ok(consumer)
            }
        }
    }

    /// Bind `queue` (declaring it if needed) and start pulling from it.
    pub async fn subscribe(
        &self,
        queue: &str,
        routing_key: &str,
    ) -> Result<QueueListener, BrokerError> {
        let consumer = self.ensure_consumer(queue, routing_key).await?;
        let messages = consumer.messages().await.map_err(BrokerError::consumer)?;
        Ok(QueueListener::new(messages, self.metrics.clone()))
    }
}

fn headers_for(config: &ExchangeConfig, message: &OutboundMessage) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in &message.headers {
        headers.insert(name.as_str(), value.as_str());
    }
    if let Some(id) = &message.message_id {
        headers.insert(MESSAGE_ID_HEADER, id.as_str());
    }
    if let (Some(ttl), true) = (message.ttl, config.message_ttl) {
        // whole seconds, never zero: a zero TTL means "never expire"
        let seconds = ttl.as_secs().max(1).to_string();
        headers.insert(MESSAGE_TTL_HEADER, seconds.as_str());
    }
    headers
}

#[async_trait]
impl Broker for JetStreamBroker {
    #[instrument(skip(self), fields(stream = %self.config.stream_name))]
    async fn declare_exchange(&self) -> Result<(), BrokerError> {
        match self.jetstream.get_stream(&self.config.stream_name).await {
            Ok(mut stream) => {
                let info = stream
                    .info()
                    .await
                    .map_err(|e| BrokerError::declare_exchange(&self.config.stream_name, e))?;
                debug!(messages = info.state.messages, "Exchange already exists");
                Ok(())
            }
            Err(_) => {
                info!(
                    subjects = %self.config.stream_subjects(),
                    message_ttl = self.config.message_ttl,
                    "Creating exchange"
                );

                self.jetstream
                    .create_stream(StreamConfig {
                        name: self.config.stream_name.clone(),
                        subjects: vec![self.config.stream_subjects()],
                        storage: StorageType::File,
                        allow_message_ttl: self.config.message_ttl,
                        ..Default::default()
                    })
                    .await
                    .map_err(|e| BrokerError::declare_exchange(&self.config.stream_name, e))?;

                self.metrics.declared("exchange");
                Ok(())
            }
        }
    }

    #[instrument(skip(self))]
    async fn declare_queue(&self, queue: &str, routing_key: &str) -> Result<(), BrokerError> {
        self.ensure_consumer(queue, routing_key).await.map(|_| ())
    }

    async fn publish(&self, message: OutboundMessage) -> Result<(), BrokerError> {
        let subject = self.config.subject_for(&message.routing_key);
        let headers = headers_for(&self.config, &message);
        let routing_key = message.routing_key.clone();
        let message_id = message.message_id.clone();

        if !message.persistent {
            // durability comes from the stream's storage type, not the message
            debug!(subject = %subject, "Transient delivery requested, stream storage applies");
        }

        let result = match self
            .jetstream
            .publish_with_headers(subject.clone(), headers, message.payload.into())
            .await
        {
            Ok(ack) => ack.await.map_err(|e| BrokerError::publish(&routing_key, e)),
            Err(e) => Err(BrokerError::publish(&routing_key, e)),
        };

        match result {
            Ok(ack) if ack.duplicate => {
                // stored once already: a retry after a lost ack, or a reused message id
                self.metrics.duplicate();
                warn!(
                    subject = %subject,
                    sequence = ack.sequence,
                    message_id = ?message_id,
                    "Broker dropped message as duplicate"
                );
                Ok(())
            }
            Ok(ack) => {
                self.metrics.published();
                debug!(
                    subject = %subject,
                    sequence = ack.sequence,
                    "Published message"
                );
                Ok(())
            }
            Err(e) => {
                self.metrics.publish_failed();
                warn!(subject = %subject, error = %e, "Publish failed");
                Err(e)
            }
        }
    }
}

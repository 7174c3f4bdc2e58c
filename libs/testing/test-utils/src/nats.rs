//! NATS test infrastructure
//!
//! Provides a `TestNats` helper that creates a NATS container with JetStream for testing.

use async_nats::Client;
use core_config::NatsConfig;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::nats::Nats;

// Re-export for test convenience (used by consumers of this crate)
#[allow(unused_imports)]
pub use futures::StreamExt;

/// Test NATS wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is dropped.
/// JetStream is enabled because the scheduler's exchange is a JetStream stream.
pub struct TestNats {
    #[allow(dead_code)]
    container: ContainerAsync<Nats>,
    client: Client,
    pub connection_string: String,
}

impl TestNats {
    /// Create a new test NATS instance with JetStream enabled (`-js`)
    pub async fn new() -> Self {
        let nats_image = Nats::default().with_tag("latest").with_cmd(["-js"]);

        let container = nats_image
            .start()
            .await
            .expect("Failed to start NATS container");

        let host_port = container
            .get_host_port_ipv4(4222)
            .await
            .expect("Failed to get NATS port");

        let connection_string = format!("nats://127.0.0.1:{}", host_port);

        let client = async_nats::connect(&connection_string)
            .await
            .expect("Failed to connect to NATS");

        tracing::info!(port = host_port, "Test NATS ready with JetStream");

        Self {
            container,
            client,
            connection_string,
        }
    }

    /// Get a cloned client (useful for passing to services)
    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Get a JetStream context for stream operations
    pub fn jetstream(&self) -> async_nats::jetstream::Context {
        async_nats::jetstream::new(self.client.clone())
    }

    /// Connection settings pointing at this container
    pub fn nats_config(&self) -> NatsConfig {
        NatsConfig::new(self.connection_string.clone()).with_connection_name("scheduler-tests")
    }

    /// Get the connection string for manual client creation
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}

impl Drop for TestNats {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test NATS container");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_filtered_consumer_only_sees_its_subject() {
        let nats = TestNats::new().await;
        let jetstream = nats.jetstream();

        let stream = jetstream
            .create_stream(async_nats::jetstream::stream::Config {
                name: "EVENTS_TEST".to_string(),
                subjects: vec!["events.>".to_string()],
                ..Default::default()
            })
            .await
            .expect("Failed to create stream");

        for subject in ["events.1", "events.2", "events.1"] {
            jetstream
                .publish(subject, "payload".into())
                .await
                .unwrap()
                .await
                .unwrap();
        }

        let consumer = stream
            .create_consumer(async_nats::jetstream::consumer::pull::Config {
                durable_name: Some("sender-1".to_string()),
                filter_subject: "events.1".to_string(),
                ..Default::default()
            })
            .await
            .expect("Failed to create consumer");

        let mut messages = consumer.fetch().max_messages(10).messages().await.unwrap();

        let mut count = 0;
        while let Some(Ok(msg)) = messages.next().await {
            assert_eq!(msg.subject.as_str(), "events.1");
            msg.ack().await.expect("Failed to ack");
            count += 1;
        }

        assert_eq!(count, 2);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_nats_config_points_at_container() {
        let nats = TestNats::new().await;
        let config = nats.nats_config();

        assert_eq!(config.url, nats.connection_string());
        let client = async_nats::connect(&config.url).await.unwrap();
        client.flush().await.unwrap();
    }
}

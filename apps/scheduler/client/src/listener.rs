//! Prints notifications arriving on the sender's queue.

use core_config::NatsConfig;
use messaging::BrokerError;
use messaging::nats::{ExchangeConfig, JetStreamBroker, QueueListener};
use tokio::task::JoinHandle;
use tracing::warn;

pub fn queue_name(sender_id: i64) -> String {
    format!("sender-{}", sender_id)
}

/// Bind to the sender's durable queue and print every message in the background.
///
/// Connection and binding errors are returned before anything is spawned.
pub async fn spawn_listener(
    nats: &NatsConfig,
    exchange: ExchangeConfig,
    sender_id: i64,
) -> Result<JoinHandle<()>, BrokerError> {
    let broker = JetStreamBroker::connect(nats, exchange).await?;
    let listener = broker
        .subscribe(&queue_name(sender_id), &sender_id.to_string())
        .await?;

    println!("Waiting for messages");
    Ok(tokio::spawn(print_messages(listener)))
}

async fn print_messages(mut listener: QueueListener) {
    while let Some(received) = listener.next::<serde_json::Value>().await {
        match received {
            Ok(body) => println!("Received a message: {}", body),
            Err(err) => warn!(error = %err, "Failed to receive notification"),
        }
    }
    warn!("Notification subscription ended");
}

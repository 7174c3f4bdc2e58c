//! Broker abstraction for exchange/queue/routing-key topologies.
//!
//! - [`Broker`]: the seam application code publishes through
//! - [`InMemoryBroker`]: direct-exchange routing in process, for tests and local runs
//! - [`nats::JetStreamBroker`]: NATS JetStream backend (feature `nats`, on by default)
//!
//! # Example
//!
//! ```ignore
//! use messaging::{Broker, OutboundMessage};
//!
//! broker.declare_exchange().await?;
//! broker.declare_queue("sender-7", "7").await?;
//! broker.publish(OutboundMessage::json("7", &notification)?).await?;
//! ```

mod broker;
mod error;
mod memory;

#[cfg(feature = "nats")]
pub mod nats;

#[cfg(any(test, feature = "mock"))]
pub use broker::MockBroker;
pub use broker::{Broker, OutboundMessage};
pub use error::BrokerError;
pub use memory::InMemoryBroker;

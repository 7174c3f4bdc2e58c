//! NATS JetStream backend.
//!
//! ```text
//!  publish(routing key "7")          stream EVENTS (events.>)
//!  ───────────────────────▶ events.7 ─────────┬──────────────▶ consumer sender-7
//!                                             └─ events.8 ───▶ consumer sender-8
//! ```

mod broker;
mod config;
mod consumer;
mod metrics;

pub use broker::{JetStreamBroker, MESSAGE_ID_HEADER, MESSAGE_TTL_HEADER};
pub use config::{ExchangeConfig, DEFAULT_STREAM_NAME, DEFAULT_SUBJECT_PREFIX};
pub use consumer::QueueListener;
pub use metrics::BrokerMetrics;

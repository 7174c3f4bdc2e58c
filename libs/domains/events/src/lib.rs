//! Scheduled events domain.
//!
//! Senders register timed events; a background [`Scheduler`] publishes each
//! event to the sender's broker queue once its fire time has passed and then
//! forgets it.
//!
//! ```text
//!  EventService ──┬── EventStore (one mutex: events + id counters)
//!                 └── TopologyManager ── Broker (exchange, queue per sender)
//!  Scheduler ─────┴── every tick: snapshot due events, publish, evict
//! ```
//!
//! Everything hangs off one [`SchedulerContext`]; there is no global state.

pub mod config;
pub mod context;
pub mod conversions;
pub mod error;
pub mod identity;
pub mod models;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod topology;

pub use config::SchedulerConfig;
pub use conversions::{EventRef, EventWindow};
pub use context::SchedulerContext;
pub use error::{EventError, EventResult};
pub use identity::IdentityAssigner;
pub use models::{Event, EventId, EventNotification, NewEvent, NotificationKind, SenderId};
pub use scheduler::{Scheduler, SweepReport};
pub use service::EventService;
pub use store::EventStore;
pub use topology::TopologyManager;

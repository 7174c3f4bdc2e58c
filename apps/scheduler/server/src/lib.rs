//! Event scheduler gRPC service
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   ↓ (gRPC, optional Zstd compression)
//! EventManagerService (service.rs)
//!   ↓ (proto ↔ domain conversions via TryFrom)
//! EventService ── EventStore (in memory)
//!   ↓                   ↑
//! TopologyManager    Scheduler (background task, every tick)
//!   ↓                   ↓
//! NATS JetStream ←──────┘
//! ```
//!
//! ## Modules
//!
//! - `server`: configuration, broker connection, lifecycle and shutdown
//! - `service`: gRPC trait implementation (EventManagerService)

pub mod server;
pub mod service;

pub use server::{run, serve, shutdown_signal};
pub use service::EventManagerService;

//! # gRPC Client Library
//!
//! Shared gRPC plumbing for the scheduler binaries: channel creation with
//! HTTP/2 tuning, connection retry, `tonic::Status` helpers, wire timestamp
//! conversions and (feature `server`) server configuration plus health
//! reporting.
//!
//! ## Quick Start
//!
//! ```ignore
//! use grpc_client::{create_channel_with_retry, endpoint_url, RetryConfig};
//! use rpc::events::v1::event_manager_client::EventManagerClient;
//!
//! let url = endpoint_url("localhost", 50051);
//! let channel = create_channel_with_retry(url, Some(RetryConfig::new().with_max_retries(5))).await?;
//! let client = EventManagerClient::new(channel);
//! ```

pub mod channel;
pub mod conversions;
pub mod error;
pub mod retry;

#[cfg(feature = "server")]
pub mod server;

// Re-export main types and functions for convenience
pub use channel::{
  ChannelConfig, create_channel, create_channel_with_config, create_channel_with_retry,
  endpoint_url,
};
pub use error::{GrpcError, GrpcResult, ToTonicOption, ToTonicResult};
pub use retry::{RetryConfig, retry, retry_with_backoff};

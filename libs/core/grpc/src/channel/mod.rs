pub mod config;

pub use config::ChannelConfig;

use crate::error::{GrpcError, GrpcResult};
use crate::retry::{RetryConfig, retry, retry_with_backoff};
use tonic::transport::{Channel, Endpoint};

/// Build an `http://host:port` URL, bracketing bare IPv6 literals.
///
/// ```
/// use grpc_client::endpoint_url;
///
/// assert_eq!(endpoint_url("localhost", 50051), "http://localhost:50051");
/// assert_eq!(endpoint_url("::1", 50051), "http://[::1]:50051");
/// assert_eq!(endpoint_url("[::1]", 50051), "http://[::1]:50051");
/// ```
pub fn endpoint_url(host: &str, port: u16) -> String {
  if host.contains(':') && !host.starts_with('[') {
    format!("http://[{}]:{}", host, port)
  } else {
    format!("http://{}:{}", host, port)
  }
}

/// Creates a gRPC channel with default tuning
///
/// ## Example
/// ```ignore
/// use grpc_client::create_channel;
/// use rpc::events::v1::event_manager_client::EventManagerClient;
///
/// let channel = create_channel("http://[::1]:50051").await?;
/// let client = EventManagerClient::new(channel);
/// ```
pub async fn create_channel(addr: impl Into<String>) -> GrpcResult<Channel> {
  create_channel_with_config(addr, ChannelConfig::default()).await
}

/// Creates a gRPC channel with custom configuration
pub async fn create_channel_with_config(
  addr: impl Into<String>,
  config: ChannelConfig,
) -> GrpcResult<Channel> {
  let addr_string = addr.into();

  let endpoint = Endpoint::from_shared(addr_string.clone()).map_err(|e| {
    tracing::error!(target: "grpc_client", addr = %addr_string, error = ?e, "Invalid URI");
    GrpcError::InvalidUri(e)
  })?;

  let connect_timeout = config.connect_timeout;
  let endpoint = config.apply_to_endpoint(endpoint);

  tracing::debug!(target: "grpc_client", addr = %addr_string, "Creating gRPC channel");

  match tokio::time::timeout(connect_timeout, endpoint.connect()).await {
    Ok(Ok(channel)) => Ok(channel),
    Ok(Err(e)) => {
      tracing::warn!(
        target: "grpc_client",
        addr = %addr_string,
        error = ?e,
        "Failed to connect to gRPC service"
      );
      Err(GrpcError::ConnectionFailed(e))
    }
    Err(_) => Err(GrpcError::ConnectionTimeout(connect_timeout)),
  }
}

/// Creates a channel, retrying while the server is unreachable
///
/// `None` uses [`RetryConfig::default`].
pub async fn create_channel_with_retry(
  addr: impl Into<String>,
  retry_config: Option<RetryConfig>,
) -> GrpcResult<Channel> {
  let addr = addr.into();

  match retry_config {
    Some(config) => {
      retry_with_backoff(
        || {
          let addr = addr.clone();
          async move { create_channel(addr).await }
        },
        config,
      )
      .await
    }
    None => {
      retry(|| {
        let addr = addr.clone();
        async move { create_channel(addr).await }
      })
      .await
    }
  }
}

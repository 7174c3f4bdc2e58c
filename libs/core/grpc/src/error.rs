use std::time::Duration;
use thiserror::Error;

pub type GrpcResult<T> = Result<T, GrpcError>;

/// Errors that can occur during gRPC channel creation and configuration
#[derive(Error, Debug)]
pub enum GrpcError {
  /// Invalid URI provided for connection
  #[error("Invalid URI: {0}")]
  InvalidUri(#[from] tonic::transport::Error),

  /// Failed to establish connection
  #[error("Connection failed: {0}")]
  ConnectionFailed(tonic::transport::Error),

  /// Connection timeout
  #[error("Connection timeout after {0:?}")]
  ConnectionTimeout(Duration),

  /// Every attempt failed; carries the last failure
  #[error("Gave up after {attempts} attempts: {last}")]
  MaxRetriesExceeded { attempts: u32, last: Box<GrpcError> },
}

impl GrpcError {
  /// Worth another attempt: the server may simply not be up yet
  pub fn is_retryable(&self) -> bool {
    matches!(
      self,
      GrpcError::ConnectionFailed(_) | GrpcError::ConnectionTimeout(_)
    )
  }
}

impl From<GrpcError> for tonic::Status {
  fn from(err: GrpcError) -> Self {
    match err {
      GrpcError::InvalidUri(_) => {
        tonic::Status::invalid_argument(err.to_string())
      }
      GrpcError::ConnectionFailed(_)
      | GrpcError::ConnectionTimeout(_)
      | GrpcError::MaxRetriesExceeded { .. } => tonic::Status::unavailable(err.to_string()),
    }
  }
}

/// Extension trait for Result types to convert errors to tonic::Status
///
/// # Example
/// ```
/// use grpc_client::error::ToTonicResult;
///
/// fn parse_id(raw: i64) -> Result<u64, String> {
///   u64::try_from(raw).map_err(|_| format!("id must not be negative, got {raw}"))
/// }
///
/// let status = parse_id(-1).to_tonic().unwrap_err();
/// assert_eq!(status.code(), tonic::Code::InvalidArgument);
/// ```
pub trait ToTonicResult<T> {
  /// Convert the error in this Result to a tonic::Status with INVALID_ARGUMENT code
  fn to_tonic(self) -> Result<T, tonic::Status>;

  /// Convert the error to a tonic::Status with a custom code
  fn to_tonic_with_code(self, code: tonic::Code) -> Result<T, tonic::Status>;
}

impl<T> ToTonicResult<T> for Result<T, String> {
  fn to_tonic(self) -> Result<T, tonic::Status> {
    self.map_err(tonic::Status::invalid_argument)
  }

  fn to_tonic_with_code(self, code: tonic::Code) -> Result<T, tonic::Status> {
    self.map_err(|e| tonic::Status::new(code, e))
  }
}

/// Extension trait for Option types to convert None to tonic::Status errors
pub trait ToTonicOption<T> {
  /// Convert None to a tonic::Status with NOT_FOUND code
  fn ok_or_not_found(self, message: impl Into<String>) -> Result<T, tonic::Status>;

  /// Convert None to a tonic::Status with INVALID_ARGUMENT code
  fn ok_or_invalid(self, message: impl Into<String>) -> Result<T, tonic::Status>;
}

impl<T> ToTonicOption<T> for Option<T> {
  fn ok_or_not_found(self, message: impl Into<String>) -> Result<T, tonic::Status> {
    self.ok_or_else(|| tonic::Status::not_found(message.into()))
  }

  fn ok_or_invalid(self, message: impl Into<String>) -> Result<T, tonic::Status> {
    self.ok_or_else(|| tonic::Status::invalid_argument(message.into()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_to_tonic_custom_code() {
    let result: Result<(), String> = Err("full".to_string());
    let status = result
      .to_tonic_with_code(tonic::Code::ResourceExhausted)
      .unwrap_err();
    assert_eq!(status.code(), tonic::Code::ResourceExhausted);
    assert_eq!(status.message(), "full");
  }

  #[test]
  fn test_option_helpers() {
    let missing: Option<i64> = None;
    assert_eq!(
      missing.ok_or_not_found("event 4").unwrap_err().code(),
      tonic::Code::NotFound
    );
    assert_eq!(
      missing.ok_or_invalid("time").unwrap_err().code(),
      tonic::Code::InvalidArgument
    );
    assert_eq!(Some(3).ok_or_not_found("x").unwrap(), 3);
  }

  #[test]
  fn test_status_mapping() {
    let status: tonic::Status = GrpcError::MaxRetriesExceeded {
      attempts: 3,
      last: Box::new(GrpcError::ConnectionTimeout(Duration::from_secs(5))),
    }
    .into();
    assert_eq!(status.code(), tonic::Code::Unavailable);
  }

  #[test]
  fn test_retryable() {
    assert!(GrpcError::ConnectionTimeout(Duration::from_secs(1)).is_retryable());
    let exhausted = GrpcError::MaxRetriesExceeded {
      attempts: 2,
      last: Box::new(GrpcError::ConnectionTimeout(Duration::from_secs(1))),
    };
    assert!(!exhausted.is_retryable());
  }
}

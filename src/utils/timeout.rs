use std::time::Duration;
use tokio::time;
use crate::error::{Result, ProtocolError};

/// Default timeout duration for network operations (5 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Grace period for draining an active connection on shutdown (10 seconds)
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Wrap an async operation with a timeout
pub async fn with_timeout<T>(
    operation: impl std::future::Future<Output = T>,
    duration: Duration,
) -> std::result::Result<T, time::error::Elapsed> {
    time::timeout(duration, operation).await
}

/// Wrap an async operation with a timeout, converting Elapsed errors to ProtocolError::Timeout
pub async fn with_timeout_error<T>(
    operation: impl std::future::Future<Output = Result<T>>,
    duration: Duration,
) -> Result<T> {
    match time::timeout(duration, operation).await {
        Ok(result) => result,
        Err(_) => Err(ProtocolError::Timeout),
    }
}

//! Error types for monitoring operations.

use thiserror::Error;
use token_monitor_core::CoreError;

/// Errors surfaced to callers of the monitor service.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Token '{0}' not found in token mapping")]
    UnknownSymbol(String),

    #[error(transparent)]
    InvalidBand(CoreError),

    #[error("Failed to fetch price for {0} from all sources")]
    UpstreamUnavailable(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Monitoring configuration store failure.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

/// Notification delivery failure. Logged by the monitor loop, never retried.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid notify target: {0}")]
    InvalidTarget(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Result type for monitor operations.
pub type MonitorResult<T> = Result<T, MonitorError>;

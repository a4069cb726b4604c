//! Error types for core data validation.

use thiserror::Error;

/// Errors raised while building core values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Low price must be less than high price (low: {low}, high: {high})")]
    InvalidBand { low: f64, high: f64 },

    #[error("Unknown chain: {0}")]
    UnknownChain(String),
}

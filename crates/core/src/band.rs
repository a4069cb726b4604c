//! Price bands and per-symbol monitoring configuration.

use crate::{normalize_symbol, CoreError};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// The `[low, high]` interval a token is watched against.
/// Always satisfies `low < high` with finite bounds, including when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBand")]
pub struct PriceBand {
    low: f64,
    high: f64,
}

#[derive(Deserialize)]
struct RawBand {
    low: f64,
    high: f64,
}

impl TryFrom<RawBand> for PriceBand {
    type Error = CoreError;

    fn try_from(raw: RawBand) -> Result<Self, Self::Error> {
        PriceBand::new(raw.low, raw.high)
    }
}

impl PriceBand {
    /// Create a band, rejecting non-finite bounds and `low >= high`.
    pub fn new(low: f64, high: f64) -> Result<Self, CoreError> {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(CoreError::InvalidBand { low, high });
        }
        Ok(Self { low, high })
    }

    #[inline]
    pub fn low(&self) -> f64 {
        self.low
    }

    #[inline]
    pub fn high(&self) -> f64 {
        self.high
    }
}

/// Monitoring configuration stored per symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Lowercase token symbol (store key)
    pub symbol: CompactString,
    /// Threshold band
    pub band: PriceBand,
    /// Telegram chat ID that receives notifications
    pub chat_id: String,
}

impl MonitorConfig {
    /// Create a new config, normalizing the symbol.
    pub fn new(symbol: &str, band: PriceBand, chat_id: impl Into<String>) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            band,
            chat_id: chat_id.into(),
        }
    }
}

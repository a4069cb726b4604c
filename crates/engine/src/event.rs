//! Notifications produced by monitor loops.

use crate::Crossing;
use compact_str::CompactString;
use token_monitor_core::{format_usd, PriceBand};

/// Something a monitor loop reports to its chat.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// First successful quote of a loop's lifetime.
    Watching { symbol: CompactString, price: f64 },
    /// Price crossed a band threshold.
    Crossed {
        symbol: CompactString,
        crossing: Crossing,
        price: f64,
        band: PriceBand,
    },
    /// The loop hit an unexpected error and stopped.
    Failed { symbol: CompactString, reason: String },
}

impl MonitorEvent {
    /// Render the chat message text.
    pub fn render(&self) -> String {
        match self {
            MonitorEvent::Watching { symbol, price } => {
                format!("👀 {} current price: {}", symbol, format_usd(*price))
            }
            MonitorEvent::Crossed {
                symbol,
                crossing: Crossing::ReachedLow,
                price,
                band,
            } => format!(
                "📉 {} reached the low price\nPrice: {} (low {})",
                symbol,
                format_usd(*price),
                format_usd(band.low())
            ),
            MonitorEvent::Crossed {
                symbol,
                crossing: Crossing::ReachedHigh,
                price,
                band,
            } => format!(
                "📈 {} reached the high price\nPrice: {} (high {})",
                symbol,
                format_usd(*price),
                format_usd(band.high())
            ),
            MonitorEvent::Failed { symbol, reason } => {
                format!("❌ Error monitoring {}: {}", symbol, reason)
            }
        }
    }
}

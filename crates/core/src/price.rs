//! Price quotes and their upstream sources.

use std::fmt;

/// Upstream price provider in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Jupiter price API (Solana aggregator)
    Jupiter,
    /// DexScreener token pairs API
    DexScreener,
    /// DexTools shared/public endpoints
    DexTools,
    /// Birdeye public price API (Solana)
    Birdeye,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Jupiter => "Jupiter",
            SourceKind::DexScreener => "DexScreener",
            SourceKind::DexTools => "DexTools",
            SourceKind::Birdeye => "Birdeye",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved USD price and the source that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuote {
    pub value: f64,
    pub source: SourceKind,
}

impl PriceQuote {
    pub fn new(value: f64, source: SourceKind) -> Self {
        Self { value, source }
    }
}

/// Check whether an upstream value can be used as a price.
#[inline]
pub fn is_usable_price(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Format price with appropriate precision based on magnitude.
pub fn format_usd(price: f64) -> String {
    if price == 0.0 {
        return "$0".to_string();
    }
    let abs_price = price.abs();
    if abs_price >= 1000.0 {
        format!("${:.2}", price)
    } else if abs_price >= 1.0 {
        format!("${:.4}", price)
    } else if abs_price >= 0.01 {
        format!("${:.6}", price)
    } else if abs_price >= 0.0001 {
        format!("${:.8}", price)
    } else {
        // Memecoin territory
        format!("${:.12}", price)
    }
}

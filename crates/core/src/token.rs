//! Token references resolved from the token mapping.

use crate::Chain;
use compact_str::CompactString;

/// A monitored token: lowercase symbol plus its on-chain location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenRef {
    /// Lowercase symbol, unique key (e.g., "kori")
    pub symbol: CompactString,
    /// Chain-specific contract/mint address, not validated
    pub address: String,
    /// Chain the address lives on
    pub chain: Chain,
}

impl TokenRef {
    /// Create a token reference, normalizing the symbol to lowercase.
    pub fn new(symbol: &str, address: impl Into<String>, chain: Chain) -> Self {
        Self {
            symbol: normalize_symbol(symbol),
            address: address.into(),
            chain,
        }
    }

    /// Shortened address for display: first and last 8 characters.
    pub fn short_address(&self) -> String {
        let chars: Vec<char> = self.address.chars().collect();
        if chars.len() <= 19 {
            return self.address.clone();
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 8..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

/// Normalize a user-supplied symbol to the registry key form.
pub fn normalize_symbol(symbol: &str) -> CompactString {
    CompactString::new(symbol.trim().to_lowercase())
}

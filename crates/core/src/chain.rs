//! Blockchain chain identifiers and utilities.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Blockchain network a token lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(u8)]
pub enum Chain {
    // EVM chains (1-9)
    Ethereum = 1,
    Arbitrum = 2,
    Optimism = 3,
    Base = 4,
    Polygon = 5,
    Avalanche = 6,
    Bsc = 7,

    // Non-EVM chains (10+)
    Solana = 10,
    Sui = 11,
}

/// Price source routing group for a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainFamily {
    Evm,
    Solana,
    Sui,
}

impl Chain {
    /// Routing family used to pick the price source chain.
    pub fn family(self) -> ChainFamily {
        match self {
            Chain::Solana => ChainFamily::Solana,
            Chain::Sui => ChainFamily::Sui,
            Chain::Ethereum
            | Chain::Arbitrum
            | Chain::Optimism
            | Chain::Base
            | Chain::Polygon
            | Chain::Avalanche
            | Chain::Bsc => ChainFamily::Evm,
        }
    }

    /// Lowercase slug used to scope upstream queries (DexScreener `chainId`, DexTools `chain`).
    pub fn as_str(self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Arbitrum => "arbitrum",
            Chain::Optimism => "optimism",
            Chain::Base => "base",
            Chain::Polygon => "polygon",
            Chain::Avalanche => "avalanche",
            Chain::Bsc => "bsc",
            Chain::Solana => "solana",
            Chain::Sui => "sui",
        }
    }

    /// Get all chain variants.
    pub fn all() -> &'static [Chain] {
        &[
            Chain::Ethereum,
            Chain::Arbitrum,
            Chain::Optimism,
            Chain::Base,
            Chain::Polygon,
            Chain::Avalanche,
            Chain::Bsc,
            Chain::Solana,
            Chain::Sui,
        ]
    }
}

impl FromStr for Chain {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chain = match s.trim().to_ascii_lowercase().as_str() {
            // The mapping file uses plain "evm" for Ethereum mainnet tokens
            "evm" | "eth" | "ethereum" => Chain::Ethereum,
            "arbitrum" | "arb" => Chain::Arbitrum,
            "optimism" | "op" => Chain::Optimism,
            "base" => Chain::Base,
            "polygon" | "matic" => Chain::Polygon,
            "avalanche" | "avax" => Chain::Avalanche,
            "bsc" | "bnb" | "binance" => Chain::Bsc,
            "solana" | "sol" => Chain::Solana,
            "sui" => Chain::Sui,
            other => return Err(CoreError::UnknownChain(other.to_string())),
        };
        Ok(chain)
    }
}

impl TryFrom<String> for Chain {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Chain> for String {
    fn from(chain: Chain) -> Self {
        chain.as_str().to_string()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

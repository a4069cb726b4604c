//! Token price resolution from public DEX price APIs.
//!
//! ## Architecture
//!
//! - `extract` - Tolerant price extraction over loosely-typed JSON payloads
//! - `rest` - HTTP price sources (Jupiter, DexScreener, DexTools, Birdeye)
//! - `resolver` - Per-chain ordered fallback across sources

pub mod error;
pub mod extract;
pub mod resolver;
pub mod rest;

pub use error::*;
pub use extract::extract_price;
pub use resolver::*;
pub use rest::*;

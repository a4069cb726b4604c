//! Token registry: symbol to address/chain mapping.
//!
//! The mapping file is plain JSON keyed by symbol:
//!
//! ```json
//! { "kori": { "address": "KoRi...", "chain": "solana" } }
//! ```

use async_trait::async_trait;
use compact_str::CompactString;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use token_monitor_core::{normalize_symbol, Chain, TokenRef};
use tracing::{debug, warn};

/// Read-only lookup of tokens by symbol.
#[async_trait]
pub trait TokenRegistry: Send + Sync {
    /// Find a token by symbol (case-insensitive).
    async fn lookup(&self, symbol: &str) -> Option<TokenRef>;
}

/// A single entry as written in the mapping file.
#[derive(Debug, Deserialize)]
struct MappingEntry {
    address: String,
    chain: String,
}

/// In-memory token mappings.
#[derive(Debug, Clone, Default)]
pub struct TokenMappings {
    tokens: HashMap<CompactString, TokenRef>,
}

impl TokenMappings {
    /// Parse mappings from JSON. Entries with an unknown chain are skipped.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, MappingEntry> = serde_json::from_str(content)?;
        let mut tokens = HashMap::with_capacity(raw.len());

        for (symbol, entry) in raw {
            match entry.chain.parse::<Chain>() {
                Ok(chain) => {
                    let token = TokenRef::new(&symbol, entry.address, chain);
                    tokens.insert(token.symbol.clone(), token);
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Skipping token mapping");
                }
            }
        }

        Ok(Self { tokens })
    }

    /// Load mappings from a file. Missing or malformed files yield an empty registry.
    pub async fn load(path: &Path) -> Self {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => match Self::from_json(&content) {
                Ok(mappings) => {
                    debug!(tokens = mappings.len(), "Loaded token mappings from {:?}", path);
                    mappings
                }
                Err(e) => {
                    warn!("Failed to parse token mappings: {}", e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("No token mapping file found at {:?}", path);
                Self::default()
            }
            Err(e) => {
                warn!("Failed to read token mapping file: {}", e);
                Self::default()
            }
        }
    }

    /// Find a token by symbol (case-insensitive).
    pub fn get(&self, symbol: &str) -> Option<TokenRef> {
        self.tokens.get(normalize_symbol(symbol).as_str()).cloned()
    }

    /// Add or replace a token.
    pub fn insert(&mut self, token: TokenRef) {
        self.tokens.insert(token.symbol.clone(), token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl TokenRegistry for TokenMappings {
    async fn lookup(&self, symbol: &str) -> Option<TokenRef> {
        self.get(symbol)
    }
}

/// Mapping file that is re-read on every lookup, so edits apply without a restart.
#[derive(Debug, Clone)]
pub struct MappingFile {
    path: PathBuf,
}

impl MappingFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenRegistry for MappingFile {
    async fn lookup(&self, symbol: &str) -> Option<TokenRef> {
        TokenMappings::load(&self.path).await.get(symbol)
    }
}

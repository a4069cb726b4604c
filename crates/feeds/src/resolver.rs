//! Price resolution with ordered per-chain fallback.

use crate::error::FeedError;
use crate::rest::{
    build_http_client, BirdeyeSource, DexScreenerSource, DexToolsSource, JupiterSource,
    PriceSource, SourceConfig,
};
use std::collections::HashMap;
use std::sync::Arc;
use token_monitor_core::{is_usable_price, Chain, ChainFamily, PriceQuote, SourceKind, TokenRef};
use tracing::{debug, warn};

const SOLANA_PLAN: &[SourceKind] = &[
    SourceKind::Jupiter,
    SourceKind::DexScreener,
    SourceKind::DexTools,
    SourceKind::Birdeye,
];
const EVM_PLAN: &[SourceKind] = &[SourceKind::DexScreener, SourceKind::DexTools];
const SUI_PLAN: &[SourceKind] = &[SourceKind::DexScreener, SourceKind::DexTools];

/// Resolves token prices by trying sources in a fixed order per chain family.
/// The first usable quote wins; nothing is averaged or aggregated.
#[derive(Default)]
pub struct PriceResolver {
    sources: HashMap<SourceKind, Arc<dyn PriceSource>>,
}

impl PriceResolver {
    /// Create an empty resolver. Sources are added with `with_source`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver backed by all HTTP sources sharing one client.
    pub fn http(config: &SourceConfig) -> Result<Self, FeedError> {
        let client = build_http_client(config)?;
        Ok(Self::new()
            .with_source(Arc::new(JupiterSource::new(client.clone())))
            .with_source(Arc::new(DexScreenerSource::new(client.clone())))
            .with_source(Arc::new(DexToolsSource::new(client.clone())))
            .with_source(Arc::new(BirdeyeSource::new(
                client,
                config.birdeye_api_key.clone(),
            ))))
    }

    /// Register a source, replacing any previous source of the same kind.
    pub fn with_source(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.sources.insert(source.kind(), source);
        self
    }

    /// Source order for a chain family.
    pub fn plan(family: ChainFamily) -> &'static [SourceKind] {
        match family {
            ChainFamily::Solana => SOLANA_PLAN,
            ChainFamily::Evm => EVM_PLAN,
            ChainFamily::Sui => SUI_PLAN,
        }
    }

    /// Resolve a token's USD price. Returns `None` when every source fails.
    pub async fn resolve(&self, address: &str, chain: Chain) -> Option<PriceQuote> {
        for &kind in Self::plan(chain.family()) {
            let Some(source) = self.sources.get(&kind) else {
                continue;
            };

            match source.fetch_price(address, chain).await {
                Ok(price) if is_usable_price(price) => {
                    debug!(source = %kind, chain = %chain, price, "Resolved price");
                    return Some(PriceQuote::new(price, kind));
                }
                Ok(price) => {
                    debug!(source = %kind, chain = %chain, price, "Source returned unusable price");
                }
                Err(e) if e.is_missing_data() => {
                    debug!(
                        source = %kind,
                        chain = %chain,
                        address,
                        error = %e,
                        "Source has no price"
                    );
                }
                Err(e) => {
                    warn!(
                        source = %kind,
                        chain = %chain,
                        address,
                        error = %e,
                        "Price source failed"
                    );
                }
            }
        }

        debug!(chain = %chain, address, "All price sources failed");
        None
    }

    /// Resolve the price of a registered token.
    pub async fn resolve_token(&self, token: &TokenRef) -> Option<PriceQuote> {
        self.resolve(&token.address, token.chain).await
    }
}

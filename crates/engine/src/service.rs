//! Monitor service: the request surface behind the chat commands.

use crate::{
    MonitorContext, MonitorError, MonitorResult, MonitorStore, MonitorSupervisor, QuoteProvider,
    TokenRegistry,
};
use std::sync::Arc;
use token_monitor_core::{normalize_symbol, MonitorConfig, PriceBand, PriceQuote, TokenRef};
use tracing::{info, warn};

/// A stored config and whether its loop is currently running.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorStatus {
    pub config: MonitorConfig,
    pub running: bool,
}

/// Registers, unregisters and inspects monitored tokens.
pub struct MonitorService {
    registry: Arc<dyn TokenRegistry>,
    store: Arc<dyn MonitorStore>,
    quotes: Arc<dyn QuoteProvider>,
    supervisor: MonitorSupervisor,
}

impl MonitorService {
    pub fn new(registry: Arc<dyn TokenRegistry>, ctx: MonitorContext) -> Self {
        Self {
            registry,
            store: Arc::clone(&ctx.store),
            quotes: Arc::clone(&ctx.quotes),
            supervisor: MonitorSupervisor::new(ctx),
        }
    }

    async fn lookup(&self, symbol: &str) -> MonitorResult<TokenRef> {
        self.registry
            .lookup(symbol)
            .await
            .ok_or_else(|| MonitorError::UnknownSymbol(normalize_symbol(symbol).to_string()))
    }

    /// Store a band for `symbol` and (re)start its loop.
    ///
    /// The band is validated before the token lookup, so an inverted band is
    /// reported even for unknown symbols.
    pub async fn register(
        &self,
        symbol: &str,
        low: f64,
        high: f64,
        chat_id: &str,
    ) -> MonitorResult<MonitorConfig> {
        let band = PriceBand::new(low, high).map_err(MonitorError::InvalidBand)?;
        let token = self.lookup(symbol).await?;

        let config = MonitorConfig::new(&token.symbol, band, chat_id);
        self.store.upsert(&config).await?;
        info!(
            symbol = %config.symbol,
            low = low,
            high = high,
            chat_id = chat_id,
            "Monitoring registered"
        );

        self.supervisor.start(token);
        Ok(config)
    }

    /// Delete a symbol's config and stop its loop. Returns whether a config existed.
    pub async fn unregister(&self, symbol: &str) -> MonitorResult<bool> {
        let symbol = normalize_symbol(symbol);
        let removed = self.store.remove(&symbol).await?;
        let stopped = self.supervisor.stop(&symbol);
        if removed || stopped {
            info!(symbol = %symbol, "Monitoring unregistered");
        }
        Ok(removed)
    }

    /// Resolve the current price of a known token.
    pub async fn price_check(&self, symbol: &str) -> MonitorResult<(TokenRef, PriceQuote)> {
        let token = self.lookup(symbol).await?;
        match self.quotes.quote(&token).await {
            Some(quote) => Ok((token, quote)),
            None => Err(MonitorError::UpstreamUnavailable(token.symbol.to_string())),
        }
    }

    /// All stored configs with their loop state, ordered by symbol.
    pub async fn list(&self) -> MonitorResult<Vec<MonitorStatus>> {
        let configs = self.store.list().await?;
        Ok(configs
            .into_iter()
            .map(|config| {
                let running = self.supervisor.is_running(&config.symbol);
                MonitorStatus { config, running }
            })
            .collect())
    }

    /// Start loops for every stored config whose token is still known.
    pub async fn resume_all(&self) -> MonitorResult<usize> {
        let mut resumed = 0;
        for config in self.store.list().await? {
            match self.registry.lookup(&config.symbol).await {
                Some(token) => {
                    self.supervisor.start(token);
                    resumed += 1;
                }
                None => {
                    warn!(symbol = %config.symbol, "Stored monitor has no token mapping, skipping");
                }
            }
        }
        info!(resumed = resumed, "Resumed stored monitors");
        Ok(resumed)
    }

    pub fn is_running(&self, symbol: &str) -> bool {
        self.supervisor.is_running(&normalize_symbol(symbol))
    }

    /// Stop every loop. Stored configs are kept for the next start.
    pub fn shutdown(&self) {
        self.supervisor.shutdown();
    }
}

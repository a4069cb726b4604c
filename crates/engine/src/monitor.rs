//! Per-symbol monitor loop.
//!
//! Each cycle reloads the symbol's config (a missing config stops the loop),
//! resolves one quote, feeds it to the threshold tracker and reports crossings.

use crate::{MonitorEvent, MonitorStore, Notifier, StoreError, ThresholdTracker};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use token_monitor_core::{PriceBand, PriceQuote, TokenRef};
use token_monitor_feeds::PriceResolver;
use tracing::{debug, error, info, warn};

/// Default time between polling cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(8);

/// Source of price quotes for registered tokens.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Resolve a quote, or `None` if no source could price the token.
    async fn quote(&self, token: &TokenRef) -> Option<PriceQuote>;
}

#[async_trait]
impl QuoteProvider for PriceResolver {
    async fn quote(&self, token: &TokenRef) -> Option<PriceQuote> {
        self.resolve_token(token).await
    }
}

/// Collaborators shared by every monitor loop.
#[derive(Clone)]
pub struct MonitorContext {
    pub quotes: Arc<dyn QuoteProvider>,
    pub store: Arc<dyn MonitorStore>,
    pub notifier: Arc<dyn Notifier>,
    pub poll_interval: Duration,
}

impl MonitorContext {
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        store: Arc<dyn MonitorStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            quotes,
            store,
            notifier,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Send a message, logging delivery failures. Never fails.
    pub async fn notify(&self, chat_id: &str, event: &MonitorEvent) {
        if let Err(e) = self.notifier.send(chat_id, &event.render()).await {
            warn!(chat_id = chat_id, error = %e, "Failed to deliver notification");
        }
    }
}

/// Monitor loop for one symbol.
pub struct MonitorLoop {
    ctx: MonitorContext,
    token: TokenRef,
    tracker: Option<ThresholdTracker>,
    band: Option<PriceBand>,
    chat_id: Option<String>,
    announced: bool,
}

impl MonitorLoop {
    pub fn new(ctx: MonitorContext, token: TokenRef) -> Self {
        Self {
            ctx,
            token,
            tracker: None,
            band: None,
            chat_id: None,
            announced: false,
        }
    }

    /// Run until the symbol's config disappears (`Ok`) or the store fails (`Err`).
    pub async fn run(&mut self) -> Result<(), StoreError> {
        let symbol = self.token.symbol.clone();
        info!(symbol = %symbol, chain = %self.token.chain, "Monitor started");

        loop {
            let Some(config) = self.ctx.store.get(&symbol).await? else {
                info!(symbol = %symbol, "Monitoring stopped: config removed");
                return Ok(());
            };

            if self.band.is_some_and(|band| band != config.band) {
                info!(
                    symbol = %symbol,
                    low = config.band.low(),
                    high = config.band.high(),
                    "Band changed, notification state reset"
                );
            }
            self.band = Some(config.band);
            if let Some(tracker) = self.tracker.as_mut() {
                tracker.set_band(config.band);
            }
            self.chat_id = Some(config.chat_id.clone());

            match self.ctx.quotes.quote(&self.token).await {
                Some(quote) => self.on_quote(quote, &config.chat_id).await,
                None => debug!(symbol = %symbol, "No quote this cycle"),
            }

            tokio::time::sleep(self.ctx.poll_interval).await;
        }
    }

    async fn on_quote(&mut self, quote: PriceQuote, chat_id: &str) {
        let symbol = self.token.symbol.clone();
        debug!(symbol = %symbol, price = quote.value, source = %quote.source, "Quote");

        if !self.announced {
            self.announced = true;
            let event = MonitorEvent::Watching {
                symbol: symbol.clone(),
                price: quote.value,
            };
            self.ctx.notify(chat_id, &event).await;
        }

        let Some(band) = self.band else {
            return;
        };
        let tracker = self
            .tracker
            .get_or_insert_with(|| ThresholdTracker::new(band));

        if let Some(crossing) = tracker.observe(quote.value) {
            info!(symbol = %symbol, price = quote.value, ?crossing, "Threshold crossed");
            let event = MonitorEvent::Crossed {
                symbol,
                crossing,
                price: quote.value,
                band,
            };
            self.ctx.notify(chat_id, &event).await;
        }
    }

    /// Run the loop, reporting an unexpected failure once to the last known chat.
    pub async fn run_reporting(mut self) {
        if let Err(e) = self.run().await {
            error!(symbol = %self.token.symbol, error = %e, "Monitor loop failed");
            if let Some(chat_id) = self.chat_id.clone() {
                let event = MonitorEvent::Failed {
                    symbol: self.token.symbol.clone(),
                    reason: e.to_string(),
                };
                self.ctx.notify(&chat_id, &event).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FlakyStore, RecordingNotifier, ScriptedQuotes};
    use crate::MemoryStore;
    use pretty_assertions::assert_eq;
    use token_monitor_core::{Chain, MonitorConfig};
    use tokio::time::{sleep, timeout};

    const PERIOD: Duration = DEFAULT_POLL_INTERVAL;

    fn kori() -> TokenRef {
        TokenRef::new("kori", "KoRiMint111", Chain::Solana)
    }

    fn kori_config(low: f64, high: f64) -> MonitorConfig {
        MonitorConfig::new("kori", PriceBand::new(low, high).unwrap(), "42")
    }

    /// Time just past the start of cycle `n` (0-based).
    fn after_cycle(n: u32) -> Duration {
        PERIOD * n + Duration::from_secs(1)
    }

    #[tokio::test(start_paused = true)]
    async fn test_kori_scenario() {
        let store = Arc::new(MemoryStore::new());
        store.upsert(&kori_config(0.00237, 0.00355)).await.unwrap();
        let quotes = ScriptedQuotes::new(&[0.004, 0.004, 0.004, 0.004, 0.002]);
        let notifier = RecordingNotifier::new();
        let ctx = MonitorContext::new(quotes.clone(), store.clone(), notifier.clone());

        let handle = tokio::spawn(MonitorLoop::new(ctx, kori()).run_reporting());
        sleep(after_cycle(5)).await;
        store.remove("kori").await.unwrap();
        timeout(PERIOD, handle).await.unwrap().unwrap();

        let texts = notifier.texts();
        assert_eq!(texts.len(), 3, "{texts:?}");
        assert!(texts[0].starts_with("👀 kori current price"));
        assert!(texts[1].contains("reached the high price"));
        assert!(texts[2].contains("reached the low price"));
        assert!(notifier.chat_ids().iter().all(|c| c == "42"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watching_sent_once_even_inside_band() {
        let store = Arc::new(MemoryStore::new());
        store.upsert(&kori_config(0.001, 0.005)).await.unwrap();
        let quotes = ScriptedQuotes::new(&[0.003, 0.003, 0.003]);
        let notifier = RecordingNotifier::new();
        let ctx = MonitorContext::new(quotes.clone(), store.clone(), notifier.clone());

        let handle = tokio::spawn(MonitorLoop::new(ctx, kori()).run_reporting());
        sleep(after_cycle(3)).await;
        store.remove("kori").await.unwrap();
        timeout(PERIOD, handle).await.unwrap().unwrap();

        assert_eq!(notifier.texts(), vec!["👀 kori current price: $0.00300000".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_band_update_resets_latches() {
        let store = Arc::new(MemoryStore::new());
        store.upsert(&kori_config(0.00237, 0.00355)).await.unwrap();
        let quotes = ScriptedQuotes::new(&[0.004, 0.004, 0.004]);
        let notifier = RecordingNotifier::new();
        let ctx = MonitorContext::new(quotes.clone(), store.clone(), notifier.clone());

        let handle = tokio::spawn(MonitorLoop::new(ctx, kori()).run_reporting());
        sleep(after_cycle(0)).await;
        assert_eq!(notifier.texts().len(), 2);

        // Still above the new high; only a latch reset lets it fire again
        store.upsert(&kori_config(0.001, 0.0039)).await.unwrap();
        sleep(PERIOD).await;

        let texts = notifier.texts();
        assert_eq!(texts.len(), 3, "{texts:?}");
        assert!(texts[2].contains("reached the high price"));
        assert!(texts[2].contains("(high $0.00390000)"));

        store.remove("kori").await.unwrap();
        timeout(PERIOD * 2, handle).await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_removal_stops_within_one_cycle() {
        let store = Arc::new(MemoryStore::new());
        store.upsert(&kori_config(0.00237, 0.00355)).await.unwrap();
        // The third sample would fire "reached low" if the loop kept going
        let quotes = ScriptedQuotes::new(&[0.004, 0.004, 0.0001]);
        let notifier = RecordingNotifier::new();
        let ctx = MonitorContext::new(quotes.clone(), store.clone(), notifier.clone());

        let handle = tokio::spawn(MonitorLoop::new(ctx, kori()).run_reporting());
        sleep(after_cycle(1)).await;
        store.remove("kori").await.unwrap();

        timeout(PERIOD, handle).await.unwrap().unwrap();
        assert_eq!(notifier.texts().len(), 2);
        assert_eq!(quotes.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_quotes_skip_evaluation() {
        let store = Arc::new(MemoryStore::new());
        store.upsert(&kori_config(0.00237, 0.00355)).await.unwrap();
        let quotes = ScriptedQuotes::with_gaps(&[None, None, Some(0.004)]);
        let notifier = RecordingNotifier::new();
        let ctx = MonitorContext::new(quotes.clone(), store.clone(), notifier.clone());

        let handle = tokio::spawn(MonitorLoop::new(ctx, kori()).run_reporting());
        sleep(after_cycle(1)).await;
        assert!(notifier.texts().is_empty());
        assert_eq!(quotes.calls(), 2);

        sleep(PERIOD).await;
        assert_eq!(notifier.texts().len(), 2);

        store.remove("kori").await.unwrap();
        timeout(PERIOD, handle).await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifier_failure_keeps_looping() {
        let store = Arc::new(MemoryStore::new());
        store.upsert(&kori_config(0.00237, 0.00355)).await.unwrap();
        let quotes = ScriptedQuotes::new(&[0.004, 0.002, 0.004]);
        let notifier = RecordingNotifier::failing();
        let ctx = MonitorContext::new(quotes.clone(), store.clone(), notifier.clone());

        let handle = tokio::spawn(MonitorLoop::new(ctx, kori()).run_reporting());
        sleep(after_cycle(2)).await;
        assert_eq!(quotes.calls(), 3);
        assert!(!handle.is_finished());
        // Every attempt was made even though none was delivered
        assert_eq!(notifier.attempts(), 4);

        store.remove("kori").await.unwrap();
        timeout(PERIOD, handle).await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_reported_once_and_exits() {
        let store = Arc::new(FlakyStore::new());
        store.upsert(&kori_config(0.00237, 0.00355)).await.unwrap();
        let quotes = ScriptedQuotes::new(&[0.003, 0.003]);
        let notifier = RecordingNotifier::new();
        let ctx = MonitorContext::new(quotes.clone(), store.clone(), notifier.clone());

        let handle = tokio::spawn(MonitorLoop::new(ctx, kori()).run_reporting());
        sleep(after_cycle(0)).await;
        store.fail_reads();

        timeout(PERIOD, handle).await.unwrap().unwrap();
        let texts = notifier.texts();
        assert_eq!(texts.len(), 2, "{texts:?}");
        assert!(texts[1].starts_with("❌ Error monitoring kori"));
        assert_eq!(quotes.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_config_exits_immediately() {
        let store = Arc::new(MemoryStore::new());
        let quotes = ScriptedQuotes::new(&[0.004]);
        let notifier = RecordingNotifier::new();
        let ctx = MonitorContext::new(quotes.clone(), store, notifier.clone());

        let mut monitor = MonitorLoop::new(ctx, kori());
        assert!(monitor.run().await.is_ok());
        assert_eq!(quotes.calls(), 0);
        assert!(notifier.texts().is_empty());
    }
}

//! Test doubles for the engine's seams.

use crate::{MemoryStore, MonitorStore, Notifier, NotifyError, QuoteProvider, StoreError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use token_monitor_core::{MonitorConfig, PriceQuote, SourceKind, TokenRef};

/// Hands out a fixed sequence of quotes, then `None` forever.
pub struct ScriptedQuotes {
    prices: Mutex<VecDeque<Option<f64>>>,
    calls: AtomicUsize,
}

impl ScriptedQuotes {
    pub fn new(prices: &[f64]) -> Arc<Self> {
        let prices: Vec<Option<f64>> = prices.iter().copied().map(Some).collect();
        Self::with_gaps(&prices)
    }

    pub fn with_gaps(prices: &[Option<f64>]) -> Arc<Self> {
        Arc::new(Self {
            prices: Mutex::new(prices.iter().copied().collect()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for ScriptedQuotes {
    async fn quote(&self, _token: &TokenRef) -> Option<PriceQuote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.prices.lock().unwrap().pop_front().flatten();
        next.map(|price| PriceQuote::new(price, SourceKind::DexScreener))
    }
}

/// Records every message; optionally fails every delivery.
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    attempts: AtomicUsize,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail: true,
        })
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn chat_ids(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(NotifyError::Delivery("chat unreachable".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Memory store whose reads can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MonitorStore for FlakyStore {
    async fn get(&self, symbol: &str) -> Result<Option<MonitorConfig>, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError("database is locked".to_string()));
        }
        self.inner.get(symbol).await
    }

    async fn upsert(&self, config: &MonitorConfig) -> Result<(), StoreError> {
        self.inner.upsert(config).await
    }

    async fn remove(&self, symbol: &str) -> Result<bool, StoreError> {
        self.inner.remove(symbol).await
    }

    async fn list(&self) -> Result<Vec<MonitorConfig>, StoreError> {
        self.inner.list().await
    }
}

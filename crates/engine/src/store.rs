//! Monitoring configuration store seam.

use crate::StoreError;
use async_trait::async_trait;
use compact_str::CompactString;
use std::collections::HashMap;
use token_monitor_core::MonitorConfig;
use tokio::sync::RwLock;

/// Key-value store of monitoring configs keyed by lowercase symbol.
/// `upsert` and `remove` must each be atomic for their symbol.
#[async_trait]
pub trait MonitorStore: Send + Sync {
    /// Get the config for a symbol.
    async fn get(&self, symbol: &str) -> Result<Option<MonitorConfig>, StoreError>;

    /// Insert or replace the config for `config.symbol`.
    async fn upsert(&self, config: &MonitorConfig) -> Result<(), StoreError>;

    /// Remove a symbol's config. Returns whether one existed.
    async fn remove(&self, symbol: &str) -> Result<bool, StoreError>;

    /// All configs, ordered by symbol.
    async fn list(&self) -> Result<Vec<MonitorConfig>, StoreError>;
}

/// In-process store, used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    configs: RwLock<HashMap<CompactString, MonitorConfig>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MonitorStore for MemoryStore {
    async fn get(&self, symbol: &str) -> Result<Option<MonitorConfig>, StoreError> {
        Ok(self.configs.read().await.get(symbol).cloned())
    }

    async fn upsert(&self, config: &MonitorConfig) -> Result<(), StoreError> {
        self.configs
            .write()
            .await
            .insert(config.symbol.clone(), config.clone());
        Ok(())
    }

    async fn remove(&self, symbol: &str) -> Result<bool, StoreError> {
        Ok(self.configs.write().await.remove(symbol).is_some())
    }

    async fn list(&self) -> Result<Vec<MonitorConfig>, StoreError> {
        let mut configs: Vec<MonitorConfig> = self.configs.read().await.values().cloned().collect();
        configs.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(configs)
    }
}

//! Owns one cancellable monitor task per symbol.

use crate::{MonitorContext, MonitorLoop};
use compact_str::CompactString;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use token_monitor_core::TokenRef;
use tokio::task::JoinHandle;
use tracing::info;

/// Running monitor task for a symbol.
struct MonitorHandle {
    /// Distinguishes a replacement loop from the one it superseded.
    generation: u64,
    task: JoinHandle<()>,
}

/// Registry of running monitor loops. At most one loop per symbol.
pub struct MonitorSupervisor {
    ctx: MonitorContext,
    tasks: Arc<DashMap<CompactString, MonitorHandle>>,
    next_generation: AtomicU64,
}

impl MonitorSupervisor {
    pub fn new(ctx: MonitorContext) -> Self {
        Self {
            ctx,
            tasks: Arc::new(DashMap::new()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Start monitoring a token, cancelling any loop already running for it.
    pub fn start(&self, token: TokenRef) {
        let symbol = token.symbol.clone();
        // The task is spawned while the entry is held so its exit cleanup
        // cannot run before the handle is registered.
        match self.tasks.entry(symbol.clone()) {
            Entry::Occupied(mut slot) => {
                let previous = slot.insert(self.spawn(token));
                previous.task.abort();
                info!(symbol = %symbol, "Replaced running monitor");
            }
            Entry::Vacant(slot) => {
                slot.insert(self.spawn(token));
            }
        }
    }

    fn spawn(&self, token: TokenRef) -> MonitorHandle {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let symbol = token.symbol.clone();
        let monitor = MonitorLoop::new(self.ctx.clone(), token);
        let tasks = Arc::clone(&self.tasks);

        let task = tokio::spawn(async move {
            monitor.run_reporting().await;
            // A replacement may already own this slot
            tasks.remove_if(&symbol, |_, handle| handle.generation == generation);
        });

        MonitorHandle { generation, task }
    }

    /// Stop a symbol's loop. Returns whether a loop was registered.
    pub fn stop(&self, symbol: &str) -> bool {
        match self.tasks.remove(symbol) {
            Some((_, handle)) => {
                handle.task.abort();
                info!(symbol = symbol, "Monitor cancelled");
                true
            }
            None => false,
        }
    }

    /// Check if a loop is running for a symbol.
    pub fn is_running(&self, symbol: &str) -> bool {
        self.tasks
            .get(symbol)
            .is_some_and(|handle| !handle.task.is_finished())
    }

    /// Symbols with a running loop, sorted.
    pub fn running_symbols(&self) -> Vec<CompactString> {
        let mut symbols: Vec<CompactString> = self
            .tasks
            .iter()
            .filter(|entry| !entry.value().task.is_finished())
            .map(|entry| entry.key().clone())
            .collect();
        symbols.sort();
        symbols
    }

    /// Abort every loop.
    pub fn shutdown(&self) {
        let count = self.tasks.len();
        self.tasks.retain(|_, handle| {
            handle.task.abort();
            false
        });
        info!(count = count, "All monitors stopped");
    }
}

impl Drop for MonitorSupervisor {
    fn drop(&mut self) {
        for entry in self.tasks.iter() {
            entry.value().task.abort();
        }
    }
}

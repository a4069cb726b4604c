//! Threshold tracking and per-token monitor loops.
//!
//! - `tracker` - Band crossing state machine with notification latches
//! - `monitor` - Per-symbol polling loop
//! - `supervisor` - One cancellable loop task per symbol
//! - `service` - Registration, unregistration and ad-hoc price checks
//! - `registry` / `store` / `notifier` - Seams to the token mapping, config store and chat

pub mod error;
pub mod event;
pub mod monitor;
pub mod notifier;
pub mod registry;
pub mod service;
pub mod store;
pub mod supervisor;
pub mod tracker;

#[cfg(test)]
pub(crate) mod testing;

pub use error::*;
pub use event::*;
pub use monitor::*;
pub use notifier::*;
pub use registry::*;
pub use service::*;
pub use store::*;
pub use supervisor::*;
pub use tracker::*;

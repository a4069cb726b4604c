//! Telegram front end for token price monitoring.
//!
//! This crate provides:
//! - SQLite-based monitoring configuration storage
//! - Telegram bot commands and band registration
//! - Telegram delivery of monitor notifications

pub mod db;
pub mod notifier;
pub mod telegram;

pub use db::{Database, DbError};
pub use notifier::TelegramNotifier;
pub use telegram::{Command, TelegramBot, TelegramError};
pub use teloxide::Bot;

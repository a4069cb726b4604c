//! Chat notification seam.

use crate::NotifyError;
use async_trait::async_trait;

/// Delivers a text message to a destination chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError>;
}

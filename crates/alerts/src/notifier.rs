//! Telegram delivery for monitor notifications.

use async_trait::async_trait;
use teloxide::prelude::*;
use token_monitor_engine::{Notifier, NotifyError};

/// Parse a stored chat id into a Telegram chat.
pub fn parse_chat_id(chat_id: &str) -> Result<ChatId, NotifyError> {
    chat_id
        .trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| NotifyError::InvalidTarget(chat_id.to_string()))
}

/// Sends monitor messages as plain text through the bot API.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let chat = parse_chat_id(chat_id)?;
        self.bot
            .send_message(chat, text)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_chat_id() {
        assert_eq!(parse_chat_id("123456").unwrap(), ChatId(123456));
        // Group chats are negative
        assert_eq!(parse_chat_id("-1001234567890").unwrap(), ChatId(-1001234567890));
        assert!(matches!(
            parse_chat_id("@channel"),
            Err(NotifyError::InvalidTarget(ref s)) if s == "@channel"
        ));
    }

    #[tokio::test]
    async fn test_invalid_target_fails_before_request() {
        let notifier = TelegramNotifier::new(Bot::new("0:test"));
        let err = notifier.send("not-a-chat", "hello").await.unwrap_err();
        assert!(matches!(err, NotifyError::InvalidTarget(_)));
    }
}

//! Telegram bot handlers.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use thiserror::Error;
use token_monitor_core::{format_usd, MonitorConfig, PriceQuote, TokenRef};
use token_monitor_engine::{MonitorError, MonitorService, MonitorStatus};
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Telegram API error: {0}")]
    Api(#[from] teloxide::RequestError),
}

/// Bot commands.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Show usage")]
    Start,
    #[command(description = "Show help")]
    Help,
    #[command(description = "Check the current price of a token. Usage: /price kori")]
    Price(String),
    #[command(description = "Stop monitoring a token. Usage: /stop kori")]
    Stop(String),
    #[command(description = "List monitored tokens")]
    List,
}

const USAGE: &str = "To monitor a token, send:\n\
                     token_name X Y\n\n\
                     Where X is low value and Y is high value\n\
                     Example: kori 0.00237 0.00355";

/// A `symbol low high` registration message.
#[derive(Debug, Clone, PartialEq)]
pub struct BandRequest {
    pub symbol: String,
    pub low: f64,
    pub high: f64,
}

/// Whether a plain message is a slash command, including unknown ones.
pub fn is_command_text(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

/// Parse `symbol low high`. Numbers may use decimal or scientific notation.
/// The band itself is validated by the service.
pub fn parse_band_request(text: &str) -> Option<BandRequest> {
    let mut parts = text.split_whitespace();
    let (symbol, low, high) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    if !symbol.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    Some(BandRequest {
        symbol: symbol.to_lowercase(),
        low: parse_number(low)?,
        high: parse_number(high)?,
    })
}

fn parse_number(s: &str) -> Option<f64> {
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reply for a successful `/price`.
pub fn format_price_reply(token: &TokenRef, quote: &PriceQuote, at: DateTime<Utc>) -> String {
    format!(
        "💰 {}\n\
         Current Price: {}\n\
         Chain: {}\n\
         Address: {}\n\
         Source: {}\n\n\
         ⏰ {}",
        token.symbol.to_uppercase(),
        format_usd(quote.value),
        token.chain.as_str().to_uppercase(),
        token.short_address(),
        quote.source,
        at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Reply for a failed `/price`.
pub fn format_price_failure(symbol: &str, err: &MonitorError) -> String {
    match err {
        MonitorError::UnknownSymbol(symbol) => format!(
            "Error: Token '{}' not found in token mapping.\n\
             Please add it to token_mapping.json first.",
            symbol
        ),
        MonitorError::UpstreamUnavailable(_) => format!(
            "❌ Failed to fetch price for {}.\n\
             Please check:\n\
             1. Token address is correct\n\
             2. Chain is correct\n\
             3. Token exists on DEX platforms\n\
             4. Token has trading pairs with liquidity",
            symbol
        ),
        other => format!("❌ Failed to fetch price for {}: {}", symbol, other),
    }
}

/// Reply for a band registration.
pub fn format_register_reply(result: &Result<MonitorConfig, MonitorError>) -> String {
    match result {
        Ok(config) => format!(
            "Monitoring {}:\n\
             Low threshold: {}\n\
             High threshold: {}\n\n\
             Starting price monitoring...",
            config.symbol,
            config.band.low(),
            config.band.high()
        ),
        Err(MonitorError::InvalidBand(_)) => {
            "Error: Low price must be less than high price.".to_string()
        }
        Err(MonitorError::UnknownSymbol(symbol)) => format!(
            "Error: Token '{}' not found in token mapping. \
             Please add it to token_mapping.json first.",
            symbol
        ),
        Err(other) => format!("Error: {}", other),
    }
}

/// Reply for `/list`.
pub fn format_monitor_list(statuses: &[MonitorStatus]) -> String {
    if statuses.is_empty() {
        return format!("No tokens are being monitored.\n\n{}", USAGE);
    }

    let mut text = String::from("Monitored tokens:\n");
    for status in statuses {
        let state = if status.running { "active" } else { "stopped" };
        text.push_str(&format!(
            "\n{}: {} - {} ({})",
            status.config.symbol,
            format_usd(status.config.band.low()),
            format_usd(status.config.band.high()),
            state
        ));
    }
    text
}

/// Telegram bot wrapper.
pub struct TelegramBot {
    bot: Bot,
    service: Arc<MonitorService>,
}

impl TelegramBot {
    pub fn new(bot: Bot, service: Arc<MonitorService>) -> Self {
        Self { bot, service }
    }

    /// Run the command and message handlers until ctrl-c.
    pub async fn run(self: Arc<Self>) {
        let bot = self.bot.clone();

        let commands = Update::filter_message().filter_command::<Command>().endpoint({
            let this = Arc::clone(&self);
            move |bot: Bot, msg: Message, cmd: Command| {
                let this = Arc::clone(&this);
                async move { this.handle_command(bot, msg, cmd).await }
            }
        });

        let messages = Update::filter_message().endpoint({
            let this = Arc::clone(&self);
            move |bot: Bot, msg: Message| {
                let this = Arc::clone(&this);
                async move { this.handle_message(bot, msg).await }
            }
        });

        let handler = dptree::entry().branch(commands).branch(messages);

        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }

    async fn handle_command(
        &self,
        bot: Bot,
        msg: Message,
        cmd: Command,
    ) -> Result<(), TelegramError> {
        debug!(chat_id = %msg.chat.id, command = ?cmd, "Command received");

        match cmd {
            Command::Start | Command::Help => {
                let text = format!(
                    "Welcome to Token Price Monitor Bot!\n\n{}\n\n{}",
                    Command::descriptions(),
                    USAGE
                );
                bot.send_message(msg.chat.id, text).await?;
            }

            Command::Price(arg) => {
                let Some(symbol) = arg.split_whitespace().next().map(str::to_lowercase) else {
                    let usage = "Usage: /price <token_name>\n\nExample: /price kori";
                    bot.send_message(msg.chat.id, usage).await?;
                    return Ok(());
                };

                let status = bot
                    .send_message(msg.chat.id, format!("Fetching price for {}...", symbol))
                    .await?;

                let text = match self.service.price_check(&symbol).await {
                    Ok((token, quote)) => format_price_reply(&token, &quote, Utc::now()),
                    Err(e) => {
                        warn!(symbol = %symbol, error = %e, "Price check failed");
                        format_price_failure(&symbol, &e)
                    }
                };
                bot.edit_message_text(msg.chat.id, status.id, text).await?;
            }

            Command::Stop(arg) => {
                let Some(symbol) = arg.split_whitespace().next().map(str::to_lowercase) else {
                    bot.send_message(msg.chat.id, "Usage: /stop <token_name>").await?;
                    return Ok(());
                };

                let text = match self.service.unregister(&symbol).await {
                    Ok(true) => format!("Stopped monitoring {}", symbol),
                    Ok(false) => format!("{} is not being monitored", symbol),
                    Err(e) => format!("Error: {}", e),
                };
                bot.send_message(msg.chat.id, text).await?;
            }

            Command::List => {
                let text = match self.service.list().await {
                    Ok(statuses) => format_monitor_list(&statuses),
                    Err(e) => format!("Error: {}", e),
                };
                bot.send_message(msg.chat.id, text).await?;
            }
        }

        Ok(())
    }

    async fn handle_message(&self, bot: Bot, msg: Message) -> Result<(), TelegramError> {
        let Some(text) = msg.text() else {
            return Ok(());
        };
        if is_command_text(text) {
            debug!(chat_id = %msg.chat.id, text = text, "Ignoring unknown command");
            return Ok(());
        }

        let Some(request) = parse_band_request(text) else {
            bot.send_message(msg.chat.id, format!("Invalid format. Please use:\n{}", USAGE))
                .await?;
            return Ok(());
        };

        let chat_id = msg.chat.id.to_string();
        let result = self
            .service
            .register(&request.symbol, request.low, request.high, &chat_id)
            .await;
        if let Err(e) = &result {
            debug!(symbol = %request.symbol, error = %e, "Registration rejected");
        }

        bot.send_message(msg.chat.id, format_register_reply(&result))
            .await?;
        Ok(())
    }
}

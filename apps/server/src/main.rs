//! Token Monitor - Telegram price band notification bot.

mod config;

use clap::Parser;
use config::{resolve_bot_token, AppConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use token_monitor_alerts::{Bot, Database, TelegramBot, TelegramNotifier};
use token_monitor_engine::{MappingFile, MonitorContext, MonitorService};
use token_monitor_feeds::PriceResolver;

/// Token Monitor CLI
#[derive(Parser, Debug)]
#[command(name = "token-monitor")]
#[command(about = "Telegram bot that watches token prices against a band", long_about = None)]
struct Args {
    /// Configuration file path (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Token mapping file path
    #[arg(short, long)]
    token_mapping: Option<String>,

    /// SQLite database URL
    #[arg(short, long)]
    database_url: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Seconds between price checks per token
    #[arg(long)]
    poll_interval_secs: Option<u64>,
}

fn init_logging(level: &str) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

fn load_config(args: &Args) -> Result<AppConfig, config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    if let Some(path) = &args.token_mapping {
        config.token_mapping_path = path.clone();
    }
    if let Some(url) = &args.database_url {
        config.database_url = url.clone();
    }
    if let Some(secs) = args.poll_interval_secs {
        config.poll_interval_secs = secs;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_logging(&args.log_level)?;
    let config = load_config(&args)?;

    let token = resolve_bot_token(
        std::env::var("TELEGRAM_BOT_TOKEN").ok(),
        Path::new("config.txt"),
    )
    .ok_or("Bot token not found: set TELEGRAM_BOT_TOKEN or write it to config.txt")?;

    info!("🚀 Token Monitor starting...");
    info!("  Token mapping: {}", config.token_mapping_path);
    info!("  Database: {}", config.database_url);
    info!("  Poll interval: {}s", config.poll_interval().as_secs());

    if !Path::new(&config.token_mapping_path).exists() {
        warn!(
            "Token mapping {} not found; every symbol will be unknown until it is created",
            config.token_mapping_path
        );
    }

    let store = Arc::new(Database::connect(&config.database_url).await?);
    let resolver = Arc::new(PriceResolver::http(&config.source_config())?);
    let bot = Bot::new(token);
    let notifier = Arc::new(TelegramNotifier::new(bot.clone()));
    let registry = Arc::new(MappingFile::new(&config.token_mapping_path));

    let ctx = MonitorContext::new(resolver, store, notifier)
        .with_poll_interval(config.poll_interval());
    let service = Arc::new(MonitorService::new(registry, ctx));

    if config.resume_on_start {
        let resumed = service.resume_all().await?;
        info!("  Resumed monitors: {}", resumed);
    }

    info!("Bot is running. Press Ctrl+C to stop...");
    let telegram = Arc::new(TelegramBot::new(bot, Arc::clone(&service)));
    telegram.run().await;

    warn!("Shutdown signal received");
    service.shutdown();
    info!("Token Monitor stopped");
    Ok(())
}

use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;

use lernbot::ai::{Assessor, LanguageModel, MistralClient};
use lernbot::cli::{Cli, Commands};
use lernbot::conversation::Engine;
use lernbot::core::{init_logger, Config};
use lernbot::storage::{AirtableStore, Repository, Store};
use lernbot::telegram::{build_dispatcher, create_bot, setup_bot_commands, HandlerDeps};

/// Main entry point for the course bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    let config = Config::from_env()?;
    init_logger(&config)?;

    match cli.command {
        Some(Commands::Check) => run_check(&config),
        Some(Commands::Health) => run_health(&config).await,
        Some(Commands::Run) | None => run_bot(config).await,
    }
}

/// Prints the missing required variables
fn run_check(config: &Config) -> Result<()> {
    let missing = config.missing_vars();
    if missing.is_empty() {
        println!("Configuration complete.");
        return Ok(());
    }

    println!("Missing environment variables:");
    for name in &missing {
        println!("  - {}", name);
    }
    Err(anyhow::anyhow!("{} required variable(s) missing", missing.len()))
}

/// Pings every external service once
async fn run_health(config: &Config) -> Result<()> {
    config.validate()?;

    let bot = create_bot(config)?;
    let store = AirtableStore::new(&config.airtable)?;
    let model = MistralClient::new(&config.mistral)?;

    let mut healthy = true;

    match bot.get_me().await {
        Ok(me) => println!("Telegram:  ok (@{})", me.username()),
        Err(e) => {
            healthy = false;
            println!("Telegram:  FAILED ({})", e);
        }
    }
    match store.ping().await {
        Ok(()) => println!("Airtable:  ok"),
        Err(e) => {
            healthy = false;
            println!("Airtable:  FAILED ({})", e);
        }
    }
    match model.ping().await {
        Ok(()) => println!("Mistral:   ok"),
        Err(e) => {
            healthy = false;
            println!("Mistral:   FAILED ({})", e);
        }
    }

    if healthy {
        Ok(())
    } else {
        Err(anyhow::anyhow!("health check failed"))
    }
}

/// Runs the bot with long polling until Ctrl+C
async fn run_bot(config: Config) -> Result<()> {
    config.validate()?;
    tracing::info!(
        environment = config.environment.as_str(),
        max_videos_per_level = config.course.max_videos_per_level,
        video_wait_secs = config.course.video_wait.as_secs(),
        "starting course bot"
    );

    let store: Arc<dyn Store> = Arc::new(AirtableStore::new(&config.airtable)?);
    let repo = Arc::new(Repository::new(store));
    let model: Arc<dyn LanguageModel> = Arc::new(MistralClient::new(&config.mistral)?);
    let engine = Arc::new(Engine::new(repo, Assessor::new(model), config.course));

    let bot = create_bot(&config)?;
    let me = bot.get_me().await?;
    tracing::info!(username = %me.username(), "connected to Telegram");

    if let Err(e) = setup_bot_commands(&bot).await {
        tracing::warn!(error = %e, "failed to set bot commands");
    }

    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    build_dispatcher(bot, HandlerDeps::new(Arc::clone(&engine)))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    for (name, stats) in engine.cache_stats().await {
        tracing::info!(
            cache = name,
            size = stats.size,
            hits = stats.hits,
            misses = stats.misses,
            hit_rate = stats.hit_rate,
            "cache statistics"
        );
    }
    tracing::info!("bot stopped");
    Ok(())
}

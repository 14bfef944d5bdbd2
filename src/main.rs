use anyhow::{Context, Result};
use reqwest::Url;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use shortform_bot::bot::{self, BotContext};
use shortform_bot::config::{BotConfig, LaunchMode};
use shortform_bot::db::{init_database_schema, AnalysisStore};
use shortform_bot::dialogue::WizardState;
use shortform_bot::generator::AnthropicClient;
use shortform_bot::localization::init_localization;
use shortform_bot::pipeline::GenerationPipeline;

const DEFAULT_LOG_FILTER: &str = "info,teloxide=warn";

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn connect_store(database_url: Option<&str>) -> AnalysisStore {
    let Some(database_url) = database_url else {
        return AnalysisStore::new(None);
    };

    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            return AnalysisStore::new(None);
        }
    };

    if let Err(e) = init_database_schema(&pool).await {
        error!(error = %e, "Failed to initialize database schema");
        return AnalysisStore::new(None);
    }

    AnalysisStore::new(Some(pool))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;
    init_tracing(config.json_logs);

    info!(flow = %config.flow.id, "Starting short-form content bot");

    config
        .flow
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid flow {}: {e}", config.flow.id))?;

    if let Err(e) = init_localization() {
        warn!(error = %e, "Localization failed to initialize; messages will show their keys");
    }

    let store = connect_store(config.database_url.as_deref()).await;

    let generator = AnthropicClient::new(
        &config.anthropic_base_url,
        &config.anthropic_api_key,
        &config.anthropic_model,
    )?;
    info!(model = %generator.model(), max_tokens = config.max_tokens, "Text generation client ready");

    let context = Arc::new(BotContext {
        flow: config.flow,
        pipeline: GenerationPipeline::new(Arc::new(generator), config.max_tokens),
        store,
    });

    let bot = Bot::new(&config.telegram_token);

    let mut dispatcher = Dispatcher::builder(bot.clone(), bot::schema())
        .dependencies(dptree::deps![InMemStorage::<WizardState>::new(), context])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build();

    match config.launch_mode {
        LaunchMode::Polling => {
            info!("Bot initialized, starting long polling");
            dispatcher.dispatch().await;
        }
        LaunchMode::Webhook { address, url } => {
            let url = Url::parse(&url).with_context(|| format!("Invalid webhook URL: {url}"))?;
            info!(%address, %url, "Bot initialized, starting webhook listener");
            let listener = webhooks::axum(bot, webhooks::Options::new(address, url))
                .await
                .context("Failed to set up webhook")?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
    }

    Ok(())
}

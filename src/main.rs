mod account;
mod api;
mod commands;
mod config;
mod projects;
mod state;

use std::collections::HashMap;
use std::sync::Arc;

use poise::serenity_prelude as serenity;
use poise::{Framework, FrameworkOptions};
use tokio::sync::RwLock;
use tracing::{error, info, warn, Level};

use api::ApiClient;
use config::AppConfig;
use projects::ProjectCatalog;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    // Load env
    let _ = dotenv::dotenv();
    let config = AppConfig::from_env()?;
    let guild_id = config.guild_id.map(serenity::GuildId::new);
    if !config.admin_ids.is_empty() {
        info!(count = config.admin_ids.len(), "Admin users configured");
    }

    let api = Arc::new(ApiClient::new(&config.api_base_url, config.http_timeout)?);
    info!(base_url = api.base_url(), "API client initialized");

    // A backend that is down at startup shouldn't keep the bot offline; admins can /finder reload.
    let catalog = match ProjectCatalog::load(&config.projects, &api).await {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(error = %format!("{:#}", e), source = %config.projects, "Starting with an empty project list");
            ProjectCatalog::new(Vec::new())
        }
    };

    let app_state = AppState {
        catalog: Arc::new(RwLock::new(catalog)),
        source: config.projects,
        api,
        github: config.github,
        admin_ids: config.admin_ids,
        sessions: Arc::new(RwLock::new(HashMap::new())),
    };

    let intents =
        serenity::GatewayIntents::GUILDS | serenity::GatewayIntents::GUILD_MESSAGES;

    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: vec![commands::finder()],
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!(bot = %ready.user.name, id = %ready.user.id, "connected to Discord");
                commands::register(ctx, &framework.options().commands, guild_id).await?;
                Ok(app_state)
            })
        })
        .build();

    info!("Starting project finder bot...");

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }

    Ok(())
}

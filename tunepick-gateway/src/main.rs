use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tunepick_gateway::discord::{DISCORD_UPLOAD_LIMIT, start_discord_bot};
use tunepick_gateway::presentation;
use tunepick_gateway::{
    EngineOptions, HttpMediaFetcher, NeteaseCatalogClient, SelectionEngine, SessionStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = tunepick_core::Config::load()?;
    let settings = &config.settings;

    // Initialize tracing; RUST_LOG overrides the configured level
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Configuration loaded (catalog: {}, ttl: {}s, scope: {})",
        settings.catalog.base_url, settings.session.ttl_seconds, settings.session.scope
    );

    let catalog = NeteaseCatalogClient::new(
        &settings.catalog.base_url,
        config.catalog_cookie(),
        settings.catalog.search_timeout(),
        settings.catalog.resolve_timeout(),
    )?;
    if config.discord_enabled() && settings.fetch.max_bytes > DISCORD_UPLOAD_LIMIT {
        warn!(
            "fetch.max_bytes ({}) exceeds the Discord upload limit ({}); large tracks will fail to send on unboosted servers",
            settings.fetch.max_bytes, DISCORD_UPLOAD_LIMIT
        );
    }
    let fetcher = HttpMediaFetcher::new(
        settings.fetch.timeout(),
        settings.fetch.max_bytes,
        settings.fetch.temp_dir(),
    )?;
    let store = SessionStore::with_system_clock(settings.session.ttl());
    let engine = Arc::new(SelectionEngine::new(
        Arc::new(catalog),
        Arc::new(fetcher),
        Arc::new(store),
        EngineOptions::from_settings(settings),
    ));

    if settings.presentation.image_list {
        // Font discovery scans every system font; keep it off the runtime
        tokio::task::spawn_blocking(presentation::init_fonts).await?;
        info!("System font database initialized");
    }

    if !config.discord_enabled() {
        warn!("Discord bot not configured (set DISCORD_BOT_TOKEN and enable in config to enable)");
        return Ok(());
    }

    let token = config.discord_bot_token().map(|s| s.to_string());
    let Some(mut client) = start_discord_bot(token, engine, settings.session.scope).await? else {
        info!("Discord bot not started");
        return Ok(());
    };

    info!("Discord bot started");
    let shard_manager = client.shard_manager.clone();
    tokio::select! {
        result = client.start() => {
            if let Err(e) = result {
                error!("Discord client error: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            shard_manager.shutdown_all().await;
        }
    }

    Ok(())
}

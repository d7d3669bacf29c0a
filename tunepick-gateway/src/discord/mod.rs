mod bot;
mod send;

use std::sync::Arc;

use serenity::prelude::*;
use tracing::info;

use tunepick_core::ScopeMode;

use crate::selection::SelectionEngine;

pub use bot::Bot;
pub use send::{DISCORD_UPLOAD_LIMIT, DiscordOutbound, attachment_name, split_discord_message};

/// Build the Discord client (optional - returns Ok(None) if no token)
pub async fn start_discord_bot(
    token: Option<String>,
    engine: Arc<SelectionEngine>,
    scope_mode: ScopeMode,
) -> Result<Option<Client>, DiscordError> {
    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => {
            info!("No DISCORD_BOT_TOKEN set, skipping Discord bot");
            return Ok(None);
        }
    };

    info!("Starting Discord bot (scope: {})...", scope_mode);

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let bot = Bot::new(engine, scope_mode);

    let client = Client::builder(&token, intents)
        .event_handler(bot)
        .await
        .map_err(|e| DiscordError::ClientError(e.to_string()))?;

    Ok(Some(client))
}

/// Discord-related errors
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("Failed to create Discord client: {0}")]
    ClientError(String),
}

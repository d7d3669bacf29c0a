use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, info};

use tunepick_core::ScopeMode;

use crate::selection::{Outcome, ScopeKey, SelectionEngine};

use super::send::DiscordOutbound;

/// Discord bot handler
///
/// Every text message is handed to the selection engine; the engine decides
/// whether it is a search, an ordinal, or chatter.
pub struct Bot {
    engine: Arc<SelectionEngine>,
    scope_mode: ScopeMode,
}

impl Bot {
    pub fn new(engine: Arc<SelectionEngine>, scope_mode: ScopeMode) -> Self {
        Self { engine, scope_mode }
    }
}

/// Scope for a Discord message. Guild channels act as groups; DMs are private.
fn scope_for(mode: ScopeMode, msg: &Message) -> ScopeKey {
    let author_id = msg.author.id.to_string();
    let group_id = msg.guild_id.map(|_| msg.channel_id.to_string());
    ScopeKey::for_message(mode, &author_id, group_id.as_deref())
}

#[async_trait]
impl EventHandler for Bot {
    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore messages from bots (including ourselves)
        if msg.author.bot {
            return;
        }

        let content = msg.content.trim();
        if content.is_empty() {
            return;
        }

        let scope = scope_for(self.scope_mode, &msg);
        let sender_id = msg.author.id.to_string();
        debug!(
            event_kind = "chat_io",
            "[scope:{}] Discord message from {} ({}): {}",
            scope,
            msg.author.name,
            sender_id,
            content
        );

        let outbound = DiscordOutbound::new(Arc::clone(&ctx.http), msg.channel_id);
        let outcome = self
            .engine
            .handle(&scope, &sender_id, content, &outbound)
            .await;

        match outcome {
            Outcome::Ignored => {}
            Outcome::Listed { count } => {
                info!("[scope:{}] Listed {} tracks", scope, count);
            }
            Outcome::Delivered { track } => {
                info!("[scope:{}] Delivered {}", scope, track);
            }
            Outcome::Rejected(reason) => {
                info!("[scope:{}] Rejected: {}", scope, reason);
            }
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);
    }
}

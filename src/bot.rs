//! Discord client adapter using serenity and songbird

use std::sync::Arc;

use async_trait::async_trait;
use serenity::Client;
use serenity::all::{Context, EventHandler, GatewayIntents, Message, Ready};
use songbird::Songbird;

use crate::router::Router;
use crate::voice::VoiceSessionManager;
use crate::{Config, Error, Result};

/// Discord event handler forwarding messages to the command router
struct Handler {
    router: Router,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!(user = %ready.user.name, "Discord bot ready");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        self.router.dispatch(&ctx, &msg).await;
    }
}

/// Connect to Discord and run the gateway until the client stops
///
/// # Errors
///
/// Returns error if the client cannot be built or the gateway connection
/// fails.
pub async fn run(config: Config) -> Result<()> {
    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILDS
        | GatewayIntents::GUILD_VOICE_STATES;

    // One songbird driver shared between serenity's voice gateway and the
    // session manager; at most one live voice connection exists behind it.
    let driver = Songbird::serenity();
    let sessions = VoiceSessionManager::new(Arc::clone(&driver));
    let router = Router::new(&config, sessions)?;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler { router })
        .voice_manager_arc(driver)
        .await
        .map_err(|e| Error::Connection(format!("Discord client error: {e}")))?;

    tracing::info!("connecting to Discord");
    client
        .start()
        .await
        .map_err(|e| Error::Connection(format!("Discord client error: {e}")))?;

    Ok(())
}

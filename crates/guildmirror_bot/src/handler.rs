//! Gateway event handler driving the command dialogue and clone runs.

use crate::{ChannelSink, MirrorConfig};
use crate::session::{CloneRequest, Outcome, PendingClone, parse_clone_command};
use guildmirror_core::GuildCloner;
use guildmirror_core::ProgressSink;
use guildmirror_discord::DiscordHost;
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::id::{ChannelId, UserId};
use serenity::prelude::{Context, EventHandler};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{error, info, warn};

/// Serenity event handler for the GuildMirror bot.
///
/// Owns the per-user dialogue table. Clone runs are spawned onto the
/// runtime so the gateway connection keeps servicing events while a run
/// is in flight; the run shares the gateway's REST client instead of
/// opening a second session.
pub struct MirrorHandler {
    config: MirrorConfig,
    pending: Mutex<HashMap<UserId, PendingClone>>,
}

impl MirrorHandler {
    /// Create a handler with the given run configuration.
    pub fn new(config: MirrorConfig) -> Self {
        Self {
            config,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Gateway intents the bot requires: guild metadata plus message
    /// content for the command dialogue.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    async fn say(ctx: &Context, channel: ChannelId, text: &str) {
        if let Err(err) = channel.say(&ctx.http, text).await {
            warn!(%channel, "failed to send reply: {err}");
        }
    }

    fn take_pending(&self, user: UserId) -> Option<PendingClone> {
        self.pending
            .lock()
            .expect("dialogue table lock poisoned")
            .remove(&user)
    }

    fn store_pending(&self, user: UserId, state: PendingClone) {
        self.pending
            .lock()
            .expect("dialogue table lock poisoned")
            .insert(user, state);
    }

    /// Spawn a confirmed clone run, relaying progress into `channel`.
    fn launch(&self, ctx: &Context, channel: ChannelId, request: CloneRequest) {
        let http = ctx.http.clone();
        let pacing = self.config.pacing;
        let retry = self.config.retry;
        tokio::spawn(async move {
            let host = DiscordHost::from_http(http.clone());
            let sink = ChannelSink::new(http, channel);
            let cloner = GuildCloner::new(host, request.source, request.target, request.options)
                .with_pacing(pacing)
                .with_retry(retry);
            match cloner.run(&sink).await {
                Ok(stats) => info!(%stats, "clone run finished"),
                Err(err) => {
                    error!("clone run failed: {err}");
                    sink.send(&format!("Clone failed: {err}")).await;
                }
            }
        });
    }
}

#[async_trait]
impl EventHandler for MirrorHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "connected to Discord");
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        if let Some((source, target)) = parse_clone_command(&msg.content) {
            info!(user = %msg.author.name, source, target, "clone command received");
            let (state, prompt) = PendingClone::new(source, target);
            self.store_pending(msg.author.id, state);
            Self::say(&ctx, msg.channel_id, prompt).await;
            return;
        }

        let Some(state) = self.take_pending(msg.author.id) else {
            return;
        };
        match state.answer(&msg.content) {
            Outcome::Prompt(next, prompt) => {
                self.store_pending(msg.author.id, next);
                Self::say(&ctx, msg.channel_id, prompt).await;
            }
            Outcome::Ignored(unchanged) => {
                self.store_pending(msg.author.id, unchanged);
            }
            Outcome::Cancelled(reply) => {
                info!(user = %msg.author.name, "clone cancelled");
                Self::say(&ctx, msg.channel_id, reply).await;
            }
            Outcome::Launch(request) => {
                info!(
                    user = %msg.author.name,
                    source = %request.source,
                    target = %request.target,
                    "clone confirmed"
                );
                Self::say(&ctx, msg.channel_id, "Starting clone run...").await;
                self.launch(&ctx, msg.channel_id, request);
            }
        }
    }
}

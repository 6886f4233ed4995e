//! Bot client setup and lifecycle management.

use crate::{MirrorConfig, MirrorHandler};
use guildmirror_error::{DiscordError, DiscordErrorKind};
use serenity::Client;
use tracing::{info, instrument};

/// The GuildMirror Discord bot.
///
/// Manages the serenity gateway client; all command handling lives in
/// [`MirrorHandler`].
///
/// # Example
/// ```no_run
/// use guildmirror_bot::{MirrorBot, MirrorConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let token = MirrorConfig::token()?;
///     let config = MirrorConfig::load()?;
///
///     let mut bot = MirrorBot::new(token, config).await?;
///     bot.start().await?;
///     Ok(())
/// }
/// ```
pub struct MirrorBot {
    client: Client,
}

impl MirrorBot {
    /// Create a new bot instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the serenity client fails to initialize.
    #[instrument(skip(token, config), fields(token_len = token.len()))]
    pub async fn new(token: String, config: MirrorConfig) -> Result<Self, DiscordError> {
        info!("Initializing GuildMirror bot");

        let handler = MirrorHandler::new(config);
        let intents = MirrorHandler::intents();
        info!("Building serenity client with intents: {intents:?}");

        let client = Client::builder(&token, intents)
            .event_handler(handler)
            .await
            .map_err(|e| {
                DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                    "Failed to build client: {e}"
                )))
            })?;

        Ok(Self { client })
    }

    /// Start the bot. Blocks until the gateway connection shuts down.
    ///
    /// # Errors
    ///
    /// Returns an error if the client fails to start or encounters a
    /// fatal gateway error.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), DiscordError> {
        info!("Starting GuildMirror bot");

        self.client.start().await.map_err(|e| {
            DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                "Client error: {e}"
            )))
        })
    }
}

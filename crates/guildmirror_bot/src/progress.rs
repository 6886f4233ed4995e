//! Progress relay into the channel the command came from.

use async_trait::async_trait;
use guildmirror_core::ProgressSink;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::sync::Arc;
use tracing::{debug, warn};

/// Progress sink that posts each line to a Discord channel.
///
/// Delivery failures are logged and swallowed; losing a status message
/// must never affect the clone run itself.
#[derive(Clone)]
pub struct ChannelSink {
    http: Arc<Http>,
    channel: ChannelId,
}

impl ChannelSink {
    /// Create a sink posting to the given channel.
    pub fn new(http: Arc<Http>, channel: ChannelId) -> Self {
        Self { http, channel }
    }
}

#[async_trait]
impl ProgressSink for ChannelSink {
    async fn send(&self, line: &str) {
        debug!(channel = %self.channel, line, "relaying progress");
        if let Err(err) = self.channel.say(&self.http, line).await {
            warn!(channel = %self.channel, "failed to post progress line: {err}");
        }
    }
}

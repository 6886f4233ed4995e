//! Discord-backed implementation of the engine's guild host.

use crate::conversions::{
    category_info, channel_info, emoji_info, map_api_error, map_lookup_error, overwrite_to_api,
    role_info,
};
use crate::fetch::fetch_image;
use async_trait::async_trait;
use guildmirror_core::GuildHost;
use guildmirror_core::model::{
    CategoryInfo, ChannelId, ChannelInfo, ChannelKind, EmojiId, EmojiInfo, GuildId, GuildProfile,
    Image, NewCategory, NewChannel, NewRole, RoleId, RoleInfo,
};
use guildmirror_error::DiscordResult;
use serenity::builder::{CreateAttachment, CreateChannel, EditGuild, EditRole};
use serenity::http::Http;
use serenity::model::Permissions;
use serenity::model::colour::Colour;
use serenity::model::guild::Role;
use serenity::model::id::{GuildId as ApiGuildId, RoleId as ApiRoleId};
use serenity::model::prelude::ChannelType;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Guild host backed by the Discord REST API.
///
/// Wraps serenity's `Http` client for the bot API and a reqwest client for
/// CDN image downloads. The `Http` handle is shared, so the interactive
/// front-end can hand the gateway's client to the clone engine instead of
/// opening a second session.
///
/// # Example
/// ```no_run
/// use guildmirror_core::{CloneOptions, GuildCloner, LogSink, model::GuildId};
/// use guildmirror_discord::DiscordHost;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let token = std::env::var("DISCORD_TOKEN")?;
/// let host = DiscordHost::new(&token);
/// let cloner = GuildCloner::new(host, GuildId(1), GuildId(2), CloneOptions::default());
/// let stats = cloner.run(&LogSink).await?;
/// println!("{stats}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DiscordHost {
    http: Arc<Http>,
    fetcher: reqwest::Client,
}

impl DiscordHost {
    /// Create a host with a fresh REST client for the given bot token.
    pub fn new(token: &str) -> Self {
        Self::from_http(Arc::new(Http::new(token)))
    }

    /// Create a host sharing an existing REST client.
    pub fn from_http(http: Arc<Http>) -> Self {
        Self {
            http,
            fetcher: reqwest::Client::new(),
        }
    }

    /// Highest stacking position among the bot's own roles in a guild.
    ///
    /// Role editability is relative to this: the bot can only touch roles
    /// stacked strictly below its top role.
    async fn bot_top_position(&self, guild: ApiGuildId, roles: &[Role]) -> DiscordResult<u16> {
        let me = self.http.get_current_user().await.map_err(map_api_error)?;
        let member = self
            .http
            .get_member(guild, me.id)
            .await
            .map_err(map_api_error)?;
        let top = member
            .roles
            .iter()
            .filter_map(|id| roles.iter().find(|role| role.id == *id))
            .map(|role| role.position)
            .max()
            .unwrap_or(0);
        debug!(guild = %guild, top, "resolved bot top role position");
        Ok(top)
    }
}

#[async_trait]
impl GuildHost for DiscordHost {
    #[instrument(skip(self))]
    async fn guild_profile(&self, guild: GuildId) -> DiscordResult<GuildProfile> {
        let partial = self
            .http
            .get_guild(ApiGuildId::new(guild.get()))
            .await
            .map_err(|e| map_lookup_error(guild, e))?;
        Ok(GuildProfile {
            id: guild,
            name: partial.name.to_string(),
            icon_url: partial.icon_url(),
        })
    }

    async fn roles(&self, guild: GuildId) -> DiscordResult<Vec<RoleInfo>> {
        let api_guild = ApiGuildId::new(guild.get());
        let roles = self
            .http
            .get_guild_roles(api_guild)
            .await
            .map_err(map_api_error)?;
        let top = self.bot_top_position(api_guild, &roles).await?;
        Ok(roles.iter().map(|role| role_info(role, top)).collect())
    }

    async fn categories(&self, guild: GuildId) -> DiscordResult<Vec<CategoryInfo>> {
        let channels = self
            .http
            .get_channels(ApiGuildId::new(guild.get()))
            .await
            .map_err(map_api_error)?;
        Ok(channels.iter().filter_map(category_info).collect())
    }

    async fn channels(&self, guild: GuildId) -> DiscordResult<Vec<ChannelInfo>> {
        let channels = self
            .http
            .get_channels(ApiGuildId::new(guild.get()))
            .await
            .map_err(map_api_error)?;
        Ok(channels.iter().filter_map(channel_info).collect())
    }

    async fn emojis(&self, guild: GuildId) -> DiscordResult<Vec<EmojiInfo>> {
        let emojis = self
            .http
            .get_emojis(ApiGuildId::new(guild.get()))
            .await
            .map_err(map_api_error)?;
        Ok(emojis.iter().map(emoji_info).collect())
    }

    async fn all_channel_ids(&self, guild: GuildId) -> DiscordResult<Vec<ChannelId>> {
        let channels = self
            .http
            .get_channels(ApiGuildId::new(guild.get()))
            .await
            .map_err(map_api_error)?;
        Ok(channels
            .iter()
            .map(|channel| ChannelId(channel.id.get()))
            .collect())
    }

    async fn create_role(&self, guild: GuildId, role: &NewRole) -> DiscordResult<RoleId> {
        let builder = EditRole::new()
            .name(&role.name)
            .colour(Colour::new(role.color))
            .permissions(Permissions::from_bits_truncate(role.permissions))
            .hoist(role.hoist)
            .mentionable(role.mentionable);
        let created = ApiGuildId::new(guild.get())
            .create_role(&self.http, builder)
            .await
            .map_err(map_api_error)?;
        Ok(RoleId(created.id.get()))
    }

    async fn create_category(
        &self,
        guild: GuildId,
        category: &NewCategory,
    ) -> DiscordResult<ChannelId> {
        let builder = CreateChannel::new(&category.name)
            .kind(ChannelType::Category)
            .position(category.position)
            .permissions(category.overwrites.iter().map(overwrite_to_api));
        let created = ApiGuildId::new(guild.get())
            .create_channel(&self.http, builder)
            .await
            .map_err(map_api_error)?;
        Ok(ChannelId(created.id.get()))
    }

    async fn create_channel(
        &self,
        guild: GuildId,
        channel: &NewChannel,
    ) -> DiscordResult<ChannelId> {
        let kind = match channel.kind {
            ChannelKind::Text => ChannelType::Text,
            ChannelKind::Voice => ChannelType::Voice,
        };
        let mut builder = CreateChannel::new(&channel.name)
            .kind(kind)
            .position(channel.position)
            .nsfw(channel.nsfw)
            .permissions(channel.overwrites.iter().map(overwrite_to_api));
        if let Some(parent) = channel.parent {
            builder = builder.category(serenity::model::id::ChannelId::new(parent.get()));
        }
        if let Some(topic) = &channel.topic {
            builder = builder.topic(topic);
        }
        if let Some(secs) = channel.slow_mode_secs {
            builder = builder.rate_limit_per_user(secs);
        }
        if let Some(bitrate) = channel.bitrate {
            builder = builder.bitrate(bitrate);
        }
        if let Some(limit) = channel.user_limit {
            builder = builder.user_limit(limit);
        }
        let created = ApiGuildId::new(guild.get())
            .create_channel(&self.http, builder)
            .await
            .map_err(map_api_error)?;
        Ok(ChannelId(created.id.get()))
    }

    async fn create_emoji(
        &self,
        guild: GuildId,
        name: &str,
        image: &Image,
    ) -> DiscordResult<EmojiId> {
        let created = ApiGuildId::new(guild.get())
            .create_emoji(&self.http, name, &image.to_data_uri())
            .await
            .map_err(map_api_error)?;
        Ok(EmojiId(created.id.get()))
    }

    async fn delete_role(&self, guild: GuildId, role: RoleId) -> DiscordResult<()> {
        ApiGuildId::new(guild.get())
            .delete_role(&self.http, ApiRoleId::new(role.get()))
            .await
            .map_err(map_api_error)
    }

    async fn delete_channel(&self, channel: ChannelId) -> DiscordResult<()> {
        serenity::model::id::ChannelId::new(channel.get())
            .delete(&self.http)
            .await
            .map(|_| ())
            .map_err(map_api_error)
    }

    async fn set_role_position(
        &self,
        guild: GuildId,
        role: RoleId,
        position: u16,
    ) -> DiscordResult<()> {
        ApiGuildId::new(guild.get())
            .edit_role_position(&self.http, ApiRoleId::new(role.get()), position)
            .await
            .map(|_| ())
            .map_err(map_api_error)
    }

    async fn set_guild_name(&self, guild: GuildId, name: &str) -> DiscordResult<()> {
        ApiGuildId::new(guild.get())
            .edit(&self.http, EditGuild::new().name(name))
            .await
            .map(|_| ())
            .map_err(map_api_error)
    }

    async fn set_guild_icon(&self, guild: GuildId, image: &Image) -> DiscordResult<()> {
        let filename = if image.mime == "image/gif" {
            "icon.gif"
        } else {
            "icon.png"
        };
        let attachment = CreateAttachment::bytes(image.data.clone(), filename);
        ApiGuildId::new(guild.get())
            .edit(&self.http, EditGuild::new().icon(Some(&attachment)))
            .await
            .map(|_| ())
            .map_err(map_api_error)
    }

    async fn fetch_image(&self, url: &str) -> DiscordResult<Image> {
        fetch_image(&self.fetcher, url).await
    }
}

//! The remote client abstraction consumed by the engine.

use crate::model::{
    CategoryInfo, ChannelId, ChannelInfo, EmojiId, EmojiInfo, GuildId, GuildProfile, Image,
    NewCategory, NewChannel, NewRole, RoleId, RoleInfo,
};
use async_trait::async_trait;
use guildmirror_error::DiscordResult;

/// Remote guild operations the orchestration engine drives.
///
/// The engine never touches a transport directly: everything it does to
/// either guild goes through this trait. The serenity-backed
/// implementation lives in `guildmirror_discord`; tests substitute an
/// in-memory host.
///
/// Every method may reject with a rate-limit error, which the engine
/// absorbs through its retry wrapper, or with any other error, which the
/// engine counts against the run.
#[async_trait]
pub trait GuildHost: Send + Sync {
    /// Resolve a guild id to its display profile.
    ///
    /// # Errors
    ///
    /// `GuildNotFound` when the id does not resolve for the acting
    /// identity. This is the engine's only fail-fast precondition.
    async fn guild_profile(&self, guild: GuildId) -> DiscordResult<GuildProfile>;

    /// Enumerate the guild's roles, including the implicit default role.
    async fn roles(&self, guild: GuildId) -> DiscordResult<Vec<RoleInfo>>;

    /// Enumerate the guild's categories.
    async fn categories(&self, guild: GuildId) -> DiscordResult<Vec<CategoryInfo>>;

    /// Enumerate the guild's text and voice channels.
    async fn channels(&self, guild: GuildId) -> DiscordResult<Vec<ChannelInfo>>;

    /// Enumerate the guild's custom emojis.
    async fn emojis(&self, guild: GuildId) -> DiscordResult<Vec<EmojiInfo>>;

    /// Ids of every channel in the guild, regardless of kind. Teardown
    /// deletes all of them, including kinds the clone phases never
    /// recreate.
    async fn all_channel_ids(&self, guild: GuildId) -> DiscordResult<Vec<ChannelId>>;

    /// Create a role, returning its freshly assigned id.
    async fn create_role(&self, guild: GuildId, role: &NewRole) -> DiscordResult<RoleId>;

    /// Create a category, returning its freshly assigned id.
    async fn create_category(
        &self,
        guild: GuildId,
        category: &NewCategory,
    ) -> DiscordResult<ChannelId>;

    /// Create a text or voice channel, returning its freshly assigned id.
    async fn create_channel(&self, guild: GuildId, channel: &NewChannel)
    -> DiscordResult<ChannelId>;

    /// Upload an emoji image under the given name, returning the new id.
    async fn create_emoji(
        &self,
        guild: GuildId,
        name: &str,
        image: &Image,
    ) -> DiscordResult<EmojiId>;

    /// Delete a role.
    async fn delete_role(&self, guild: GuildId, role: RoleId) -> DiscordResult<()>;

    /// Delete a channel of any kind.
    async fn delete_channel(&self, channel: ChannelId) -> DiscordResult<()>;

    /// Move a role to the given stacking position.
    async fn set_role_position(
        &self,
        guild: GuildId,
        role: RoleId,
        position: u16,
    ) -> DiscordResult<()>;

    /// Set the guild's display name.
    async fn set_guild_name(&self, guild: GuildId, name: &str) -> DiscordResult<()>;

    /// Set the guild's icon.
    async fn set_guild_icon(&self, guild: GuildId, image: &Image) -> DiscordResult<()>;

    /// Download an image for by-value cloning (emoji, icon).
    ///
    /// Transport failures surface as `ImageFetch` errors, which the retry
    /// wrapper treats as non-rate-limit and propagates.
    async fn fetch_image(&self, url: &str) -> DiscordResult<Image>;
}

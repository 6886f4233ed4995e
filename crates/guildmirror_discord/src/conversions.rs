//! Conversions between serenity models and engine snapshot types.
//!
//! The engine works on plain snapshot structs with raw permission bitsets
//! and typed snowflake ids. This module converts serenity's guild models
//! into those snapshots and back into creation builder inputs, and maps
//! serenity errors onto the workspace error taxonomy.

use guildmirror_core::model::{
    CategoryInfo, ChannelId, ChannelInfo, ChannelKind, EmojiInfo, GuildId, Overwrite,
    OverwriteSubject, RoleId, UserId,
};
use guildmirror_error::{DiscordError, DiscordErrorKind};
use serenity::http::{HttpError, StatusCode};
use serenity::model::channel::{GuildChannel, PermissionOverwrite, PermissionOverwriteType};
use serenity::model::guild::{Emoji, Role};
use serenity::model::prelude::ChannelType;

/// Classify an unsuccessful Discord API response by status code.
///
/// 429 is the transient rate-limit signal the retry wrapper absorbs;
/// everything else is terminal for the operation at hand.
pub(crate) fn kind_for_status(status: StatusCode, message: &str) -> DiscordErrorKind {
    match status {
        StatusCode::TOO_MANY_REQUESTS => DiscordErrorKind::RateLimited {
            retry_after_secs: None,
        },
        StatusCode::UNAUTHORIZED => DiscordErrorKind::InvalidToken,
        StatusCode::FORBIDDEN => DiscordErrorKind::PermissionDenied(message.to_string()),
        _ => DiscordErrorKind::Api(format!("{status}: {message}")),
    }
}

/// Map a serenity error from a guild operation onto the error taxonomy.
#[track_caller]
pub(crate) fn map_api_error(err: serenity::Error) -> DiscordError {
    let kind = match &err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            kind_for_status(response.status_code, &response.error.message)
        }
        _ => DiscordErrorKind::Api(err.to_string()),
    };
    DiscordError::new(kind)
}

/// Map a serenity error from a guild *lookup* onto the error taxonomy.
///
/// A 404 or 403 on the lookup means the guild does not exist or the bot is
/// not a member of it; both abort the run as `GuildNotFound`.
#[track_caller]
pub(crate) fn map_lookup_error(guild: GuildId, err: serenity::Error) -> DiscordError {
    if let serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) = &err {
        if matches!(
            response.status_code,
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN
        ) {
            return DiscordError::new(DiscordErrorKind::GuildNotFound(guild.get()));
        }
    }
    map_api_error(err)
}

/// Whether the acting identity may edit or delete a role.
///
/// Integration-managed roles are off limits, as is any role stacked at or
/// above the bot's own highest role.
pub(crate) fn is_editable(managed: bool, position: u16, bot_top_position: u16) -> bool {
    !managed && position < bot_top_position
}

/// Snapshot a serenity role.
pub(crate) fn role_info(
    role: &Role,
    bot_top_position: u16,
) -> guildmirror_core::model::RoleInfo {
    guildmirror_core::model::RoleInfo {
        id: RoleId(role.id.get()),
        name: role.name.to_string(),
        color: role.colour.0,
        permissions: role.permissions.bits(),
        hoist: role.hoist,
        mentionable: role.mentionable,
        managed: role.managed,
        editable: is_editable(role.managed, role.position, bot_top_position),
        is_default: role.id.get() == role.guild_id.get(),
        position: role.position,
    }
}

/// Snapshot a category channel, or `None` for any other channel kind.
pub(crate) fn category_info(channel: &GuildChannel) -> Option<CategoryInfo> {
    if channel.kind != ChannelType::Category {
        return None;
    }
    Some(CategoryInfo {
        id: ChannelId(channel.id.get()),
        name: channel.name.to_string(),
        position: channel.position,
        overwrites: channel
            .permission_overwrites
            .iter()
            .filter_map(overwrite_from_api)
            .collect(),
    })
}

/// Snapshot a text or voice channel, or `None` for any other kind.
///
/// Threads, forums, and the other specialist channel kinds are outside the
/// cloneable structure; they are torn down on the target but never
/// recreated.
pub(crate) fn channel_info(channel: &GuildChannel) -> Option<ChannelInfo> {
    let kind = match channel.kind {
        ChannelType::Text => ChannelKind::Text,
        ChannelType::Voice => ChannelKind::Voice,
        _ => return None,
    };
    Some(ChannelInfo {
        id: ChannelId(channel.id.get()),
        name: channel.name.to_string(),
        kind,
        parent_id: channel.parent_id.map(|id| ChannelId(id.get())),
        position: channel.position,
        overwrites: channel
            .permission_overwrites
            .iter()
            .filter_map(overwrite_from_api)
            .collect(),
        topic: channel.topic.as_ref().map(|t| t.to_string()),
        nsfw: channel.nsfw,
        slow_mode_secs: channel.rate_limit_per_user,
        bitrate: channel.bitrate,
        user_limit: channel.user_limit,
    })
}

/// CDN URL for an emoji image. Animated emojis are stored as GIFs.
pub(crate) fn emoji_image_url(id: u64, animated: bool) -> String {
    let extension = if animated { "gif" } else { "png" };
    format!("https://cdn.discordapp.com/emojis/{id}.{extension}")
}

/// Snapshot a custom emoji.
pub(crate) fn emoji_info(emoji: &Emoji) -> EmojiInfo {
    EmojiInfo {
        id: guildmirror_core::model::EmojiId(emoji.id.get()),
        name: emoji.name.to_string(),
        image_url: emoji_image_url(emoji.id.get(), emoji.animated),
    }
}

/// Convert a serenity permission overwrite into a snapshot overwrite.
/// Unknown subject kinds are dropped.
pub(crate) fn overwrite_from_api(overwrite: &PermissionOverwrite) -> Option<Overwrite> {
    let subject = match overwrite.kind {
        PermissionOverwriteType::Role(id) => OverwriteSubject::Role(RoleId(id.get())),
        PermissionOverwriteType::Member(id) => OverwriteSubject::Member(UserId(id.get())),
        _ => return None,
    };
    Some(Overwrite {
        subject,
        allow: overwrite.allow.bits(),
        deny: overwrite.deny.bits(),
    })
}

/// Convert an already-translated snapshot overwrite back to the API shape.
pub(crate) fn overwrite_to_api(overwrite: &Overwrite) -> PermissionOverwrite {
    let kind = match overwrite.subject {
        OverwriteSubject::Role(id) => {
            PermissionOverwriteType::Role(serenity::model::id::RoleId::new(id.get()))
        }
        OverwriteSubject::Member(id) => {
            PermissionOverwriteType::Member(serenity::model::id::UserId::new(id.get()))
        }
    };
    PermissionOverwrite {
        allow: serenity::model::Permissions::from_bits_truncate(overwrite.allow),
        deny: serenity::model::Permissions::from_bits_truncate(overwrite.deny),
        kind,
    }
}

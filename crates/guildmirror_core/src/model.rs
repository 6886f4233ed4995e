//! Data model for guild structure snapshots.
//!
//! These types carry the attributes the engine reads from the source guild
//! and writes to the target. They are deliberately independent of any
//! client library: the serenity-backed host converts to and from them, and
//! test hosts construct them directly.
//!
//! Ids are platform-assigned snowflakes. A source id is meaningful only
//! relative to the guild it was read from; the engine's mapping tables
//! carry the correspondence to freshly assigned target ids.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

macro_rules! snowflake {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            derive_more::Display,
            derive_more::From,
        )]
        pub struct $name(pub u64);

        impl $name {
            /// The raw snowflake value.
            pub fn get(self) -> u64 {
                self.0
            }
        }
    };
}

snowflake!(
    /// Id of a guild (collaboration space).
    GuildId
);
snowflake!(
    /// Id of a role.
    RoleId
);
snowflake!(
    /// Id of a channel or category.
    ChannelId
);
snowflake!(
    /// Id of a platform-wide user.
    UserId
);
snowflake!(
    /// Id of a custom emoji.
    EmojiId
);

/// The subject a permission overwrite applies to.
///
/// Role subjects must be rewritten through the role map when copied to the
/// target; member ids are platform-global and pass through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverwriteSubject {
    /// Overwrite applies to a role.
    Role(RoleId),
    /// Overwrite applies to an individual member.
    Member(UserId),
}

/// A per-entity override of a role's or member's effective permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overwrite {
    /// Who the overwrite applies to.
    pub subject: OverwriteSubject,
    /// Permission bits explicitly granted.
    pub allow: u64,
    /// Permission bits explicitly denied.
    pub deny: u64,
}

/// Snapshot of a role as read from a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleInfo {
    /// Platform-assigned role id.
    pub id: RoleId,
    /// Role name.
    pub name: String,
    /// Display color as a packed RGB value.
    pub color: u32,
    /// Permission bitset.
    pub permissions: u64,
    /// Whether members are displayed separately in the sidebar.
    pub hoist: bool,
    /// Whether the role can be mentioned.
    pub mentionable: bool,
    /// Integration-managed roles cannot be deleted or recreated.
    pub managed: bool,
    /// Whether the acting identity may edit or delete this role.
    pub editable: bool,
    /// The implicit default role, excluded from create/delete operations.
    pub is_default: bool,
    /// Stacking position; roles form a strict total order by position.
    pub position: u16,
}

impl RoleInfo {
    /// Build the creation payload for an equivalent role on the target.
    pub fn to_new_role(&self) -> NewRole {
        NewRole {
            name: self.name.clone(),
            color: self.color,
            permissions: self.permissions,
            hoist: self.hoist,
            mentionable: self.mentionable,
        }
    }
}

/// Attributes carried when creating a role on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    /// Role name.
    pub name: String,
    /// Display color as a packed RGB value.
    pub color: u32,
    /// Permission bitset.
    pub permissions: u64,
    /// Whether members are displayed separately in the sidebar.
    pub hoist: bool,
    /// Whether the role can be mentioned.
    pub mentionable: bool,
}

/// Snapshot of a category as read from a guild.
///
/// Categories have no parent and act as optional parents for channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInfo {
    /// Platform-assigned channel id.
    pub id: ChannelId,
    /// Category name.
    pub name: String,
    /// Sort position among categories.
    pub position: u16,
    /// Permission overwrites, in source order.
    pub overwrites: Vec<Overwrite>,
}

/// Attributes carried when creating a category on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    /// Category name.
    pub name: String,
    /// Sort position among categories.
    pub position: u16,
    /// Already-translated permission overwrites.
    pub overwrites: Vec<Overwrite>,
}

/// The channel kinds the engine clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ChannelKind {
    /// Text communication channel.
    #[display("text")]
    Text,
    /// Voice communication channel.
    #[display("voice")]
    Voice,
}

/// Snapshot of a non-category channel as read from a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Platform-assigned channel id.
    pub id: ChannelId,
    /// Channel name.
    pub name: String,
    /// Text or voice.
    pub kind: ChannelKind,
    /// Parent category, if any. Meaningful only in the source guild.
    pub parent_id: Option<ChannelId>,
    /// Sort position among sibling channels.
    pub position: u16,
    /// Permission overwrites, in source order.
    pub overwrites: Vec<Overwrite>,
    /// Channel topic (text channels).
    pub topic: Option<String>,
    /// Age-restricted flag (text channels).
    pub nsfw: bool,
    /// Slow mode interval in seconds (text channels).
    pub slow_mode_secs: Option<u16>,
    /// Audio bitrate (voice channels).
    pub bitrate: Option<u32>,
    /// Maximum connected users (voice channels).
    pub user_limit: Option<u32>,
}

/// Attributes carried when creating a channel on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChannel {
    /// Channel name.
    pub name: String,
    /// Text or voice.
    pub kind: ChannelKind,
    /// Parent category on the *target*, already resolved through the
    /// category map. `None` creates the channel top-level.
    pub parent: Option<ChannelId>,
    /// Sort position among sibling channels.
    pub position: u16,
    /// Already-translated permission overwrites.
    pub overwrites: Vec<Overwrite>,
    /// Channel topic (text channels).
    pub topic: Option<String>,
    /// Age-restricted flag (text channels).
    pub nsfw: bool,
    /// Slow mode interval in seconds (text channels).
    pub slow_mode_secs: Option<u16>,
    /// Audio bitrate (voice channels).
    pub bitrate: Option<u32>,
    /// Maximum connected users (voice channels).
    pub user_limit: Option<u32>,
}

/// Snapshot of a custom emoji as read from a guild.
///
/// Emojis are cloned by value: the image is downloaded from `image_url`
/// and re-uploaded to the target under the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiInfo {
    /// Platform-assigned emoji id.
    pub id: EmojiId,
    /// Emoji name.
    pub name: String,
    /// CDN URL of the emoji image.
    pub image_url: String,
}

/// Display-level guild attributes applied in the profile phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildProfile {
    /// Platform-assigned guild id.
    pub id: GuildId,
    /// Guild display name.
    pub name: String,
    /// CDN URL of the guild icon, if one is set.
    pub icon_url: Option<String>,
}

/// Raw image bytes with their MIME type, as produced by the image-fetch
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Image bytes.
    pub data: Vec<u8>,
    /// MIME type reported by the server (e.g. `image/png`).
    pub mime: String,
}

impl Image {
    /// Encode as an RFC 2397 data URI (`data:<mime>;base64,<payload>`),
    /// the format Discord's emoji and icon endpoints accept.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_encodes_mime_and_payload() {
        let image = Image {
            data: vec![0x89, 0x50, 0x4e, 0x47],
            mime: "image/png".to_string(),
        };
        assert_eq!(image.to_data_uri(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn snowflakes_display_as_raw_values() {
        assert_eq!(GuildId(42).to_string(), "42");
        assert_eq!(RoleId::from(7_u64).get(), 7);
    }
}

//! Integration tests for the clone orchestration engine, driven by an
//! in-memory guild host.

use async_trait::async_trait;
use guildmirror_core::model::{
    CategoryInfo, ChannelId, ChannelInfo, ChannelKind, EmojiId, EmojiInfo, GuildId, GuildProfile,
    Image, NewCategory, NewChannel, NewRole, Overwrite, OverwriteSubject, RoleId, RoleInfo, UserId,
};
use guildmirror_core::{CloneOptions, GuildCloner, GuildHost, LogSink};
use guildmirror_error::{DiscordError, DiscordErrorKind, DiscordResult};
use guildmirror_rate_limit::InstantSleeper;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

const SOURCE: GuildId = GuildId(1);
const TARGET: GuildId = GuildId(2);

#[derive(Debug, Default)]
struct MockGuild {
    name: String,
    icon_url: Option<String>,
    roles: Vec<RoleInfo>,
    categories: Vec<CategoryInfo>,
    channels: Vec<ChannelInfo>,
    emojis: Vec<EmojiInfo>,
}

#[derive(Debug, Default)]
struct MockState {
    guilds: HashMap<u64, MockGuild>,
    next_id: u64,
    /// Every create/delete/set call, in issue order.
    mutations: Vec<String>,
    repositions: Vec<(RoleId, u16)>,
    created_roles: Vec<(RoleId, NewRole)>,
    created_categories: Vec<(ChannelId, NewCategory)>,
    created_channels: Vec<(ChannelId, NewChannel)>,
    created_emojis: Vec<String>,
    set_names: Vec<String>,
    set_icons: usize,
    /// Entity names whose creation fails with an API error.
    fail_creates: HashSet<String>,
    /// Entity names whose creation rate-limits this many times first.
    rate_limit_creates: HashMap<String, usize>,
    /// Image URLs whose fetch fails.
    fail_fetch: HashSet<String>,
}

#[derive(Debug, Clone, Default)]
struct MockHost {
    state: Arc<Mutex<MockState>>,
}

impl MockHost {
    fn new() -> Self {
        let host = Self::default();
        host.with_state(|s| s.next_id = 1_000);
        host
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    fn add_guild(&self, id: GuildId, name: &str, icon_url: Option<&str>) {
        self.with_state(|s| {
            s.guilds.insert(id.get(), MockGuild {
                name: name.to_string(),
                icon_url: icon_url.map(str::to_string),
                ..Default::default()
            });
        });
    }

    fn guild<T>(&self, id: GuildId, f: impl FnOnce(&mut MockGuild) -> T) -> T {
        self.with_state(|s| f(s.guilds.get_mut(&id.get()).expect("guild seeded")))
    }

    fn mutation_count(&self) -> usize {
        self.with_state(|s| s.mutations.len())
    }

    fn take_err(name: &str, state: &mut MockState) -> Option<DiscordError> {
        if let Some(remaining) = state.rate_limit_creates.get_mut(name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Some(DiscordError::new(DiscordErrorKind::RateLimited {
                    retry_after_secs: Some(0.5),
                }));
            }
        }
        if state.fail_creates.contains(name) {
            return Some(DiscordError::new(DiscordErrorKind::Api(format!(
                "creation of {name} rejected"
            ))));
        }
        None
    }
}

fn not_found(guild: GuildId) -> DiscordError {
    DiscordError::new(DiscordErrorKind::GuildNotFound(guild.get()))
}

#[async_trait]
impl GuildHost for MockHost {
    async fn guild_profile(&self, guild: GuildId) -> DiscordResult<GuildProfile> {
        self.with_state(|s| {
            s.guilds
                .get(&guild.get())
                .map(|g| GuildProfile {
                    id: guild,
                    name: g.name.clone(),
                    icon_url: g.icon_url.clone(),
                })
                .ok_or_else(|| not_found(guild))
        })
    }

    async fn roles(&self, guild: GuildId) -> DiscordResult<Vec<RoleInfo>> {
        self.with_state(|s| {
            s.guilds
                .get(&guild.get())
                .map(|g| g.roles.clone())
                .ok_or_else(|| not_found(guild))
        })
    }

    async fn categories(&self, guild: GuildId) -> DiscordResult<Vec<CategoryInfo>> {
        self.with_state(|s| {
            s.guilds
                .get(&guild.get())
                .map(|g| g.categories.clone())
                .ok_or_else(|| not_found(guild))
        })
    }

    async fn channels(&self, guild: GuildId) -> DiscordResult<Vec<ChannelInfo>> {
        self.with_state(|s| {
            s.guilds
                .get(&guild.get())
                .map(|g| g.channels.clone())
                .ok_or_else(|| not_found(guild))
        })
    }

    async fn emojis(&self, guild: GuildId) -> DiscordResult<Vec<EmojiInfo>> {
        self.with_state(|s| {
            s.guilds
                .get(&guild.get())
                .map(|g| g.emojis.clone())
                .ok_or_else(|| not_found(guild))
        })
    }

    async fn all_channel_ids(&self, guild: GuildId) -> DiscordResult<Vec<ChannelId>> {
        self.with_state(|s| {
            s.guilds
                .get(&guild.get())
                .map(|g| {
                    g.categories
                        .iter()
                        .map(|c| c.id)
                        .chain(g.channels.iter().map(|c| c.id))
                        .collect()
                })
                .ok_or_else(|| not_found(guild))
        })
    }

    async fn create_role(&self, guild: GuildId, role: &NewRole) -> DiscordResult<RoleId> {
        self.with_state(|s| {
            s.mutations.push(format!("create_role {}", role.name));
            if let Some(err) = Self::take_err(&role.name, s) {
                return Err(err);
            }
            s.next_id += 1;
            let id = RoleId(s.next_id);
            let g = s.guilds.get_mut(&guild.get()).ok_or_else(|| not_found(guild))?;
            let position = g.roles.len() as u16;
            g.roles.push(RoleInfo {
                id,
                name: role.name.clone(),
                color: role.color,
                permissions: role.permissions,
                hoist: role.hoist,
                mentionable: role.mentionable,
                managed: false,
                editable: true,
                is_default: false,
                position,
            });
            s.created_roles.push((id, role.clone()));
            Ok(id)
        })
    }

    async fn create_category(
        &self,
        guild: GuildId,
        category: &NewCategory,
    ) -> DiscordResult<ChannelId> {
        self.with_state(|s| {
            s.mutations.push(format!("create_category {}", category.name));
            if let Some(err) = Self::take_err(&category.name, s) {
                return Err(err);
            }
            s.next_id += 1;
            let id = ChannelId(s.next_id);
            let g = s.guilds.get_mut(&guild.get()).ok_or_else(|| not_found(guild))?;
            g.categories.push(CategoryInfo {
                id,
                name: category.name.clone(),
                position: category.position,
                overwrites: category.overwrites.clone(),
            });
            s.created_categories.push((id, category.clone()));
            Ok(id)
        })
    }

    async fn create_channel(
        &self,
        guild: GuildId,
        channel: &NewChannel,
    ) -> DiscordResult<ChannelId> {
        self.with_state(|s| {
            s.mutations.push(format!("create_channel {}", channel.name));
            if let Some(err) = Self::take_err(&channel.name, s) {
                return Err(err);
            }
            s.next_id += 1;
            let id = ChannelId(s.next_id);
            let g = s.guilds.get_mut(&guild.get()).ok_or_else(|| not_found(guild))?;
            g.channels.push(ChannelInfo {
                id,
                name: channel.name.clone(),
                kind: channel.kind,
                parent_id: channel.parent,
                position: channel.position,
                overwrites: channel.overwrites.clone(),
                topic: channel.topic.clone(),
                nsfw: channel.nsfw,
                slow_mode_secs: channel.slow_mode_secs,
                bitrate: channel.bitrate,
                user_limit: channel.user_limit,
            });
            s.created_channels.push((id, channel.clone()));
            Ok(id)
        })
    }

    async fn create_emoji(
        &self,
        guild: GuildId,
        name: &str,
        _image: &Image,
    ) -> DiscordResult<EmojiId> {
        self.with_state(|s| {
            s.mutations.push(format!("create_emoji {name}"));
            if let Some(err) = Self::take_err(name, s) {
                return Err(err);
            }
            s.next_id += 1;
            let id = EmojiId(s.next_id);
            let g = s.guilds.get_mut(&guild.get()).ok_or_else(|| not_found(guild))?;
            g.emojis.push(EmojiInfo {
                id,
                name: name.to_string(),
                image_url: format!("https://cdn.test/emojis/{}.png", id.get()),
            });
            s.created_emojis.push(name.to_string());
            Ok(id)
        })
    }

    async fn delete_role(&self, guild: GuildId, role: RoleId) -> DiscordResult<()> {
        self.with_state(|s| {
            s.mutations.push(format!("delete_role {role}"));
            let g = s.guilds.get_mut(&guild.get()).ok_or_else(|| not_found(guild))?;
            g.roles.retain(|r| r.id != role);
            Ok(())
        })
    }

    async fn delete_channel(&self, channel: ChannelId) -> DiscordResult<()> {
        self.with_state(|s| {
            s.mutations.push(format!("delete_channel {channel}"));
            for g in s.guilds.values_mut() {
                g.categories.retain(|c| c.id != channel);
                g.channels.retain(|c| c.id != channel);
            }
            Ok(())
        })
    }

    async fn set_role_position(
        &self,
        _guild: GuildId,
        role: RoleId,
        position: u16,
    ) -> DiscordResult<()> {
        self.with_state(|s| {
            s.mutations.push(format!("set_role_position {role}"));
            s.repositions.push((role, position));
            Ok(())
        })
    }

    async fn set_guild_name(&self, guild: GuildId, name: &str) -> DiscordResult<()> {
        self.with_state(|s| {
            s.mutations.push(format!("set_guild_name {name}"));
            let g = s.guilds.get_mut(&guild.get()).ok_or_else(|| not_found(guild))?;
            g.name = name.to_string();
            s.set_names.push(name.to_string());
            Ok(())
        })
    }

    async fn set_guild_icon(&self, _guild: GuildId, _image: &Image) -> DiscordResult<()> {
        self.with_state(|s| {
            s.mutations.push("set_guild_icon".to_string());
            s.set_icons += 1;
            Ok(())
        })
    }

    async fn fetch_image(&self, url: &str) -> DiscordResult<Image> {
        self.with_state(|s| {
            if s.fail_fetch.contains(url) {
                return Err(DiscordError::new(DiscordErrorKind::ImageFetch(format!(
                    "download failed: {url}"
                ))));
            }
            Ok(Image {
                data: vec![1, 2, 3],
                mime: "image/png".to_string(),
            })
        })
    }
}

fn role(id: u64, name: &str, position: u16) -> RoleInfo {
    RoleInfo {
        id: RoleId(id),
        name: name.to_string(),
        color: 0x00_ff_00,
        permissions: 0x0000_0000_0000_0800,
        hoist: false,
        mentionable: true,
        managed: false,
        editable: true,
        is_default: false,
        position,
    }
}

fn text_channel(id: u64, name: &str, position: u16, parent: Option<u64>) -> ChannelInfo {
    ChannelInfo {
        id: ChannelId(id),
        name: name.to_string(),
        kind: ChannelKind::Text,
        parent_id: parent.map(ChannelId),
        position,
        overwrites: Vec::new(),
        topic: Some("topic".to_string()),
        nsfw: false,
        slow_mode_secs: Some(5),
        bitrate: None,
        user_limit: None,
    }
}

fn cloner(host: MockHost, options: CloneOptions) -> GuildCloner<MockHost> {
    GuildCloner::new(host, SOURCE, TARGET, options)
        .with_sleeper(Arc::new(InstantSleeper::new()))
}

async fn run(host: &MockHost, options: CloneOptions) -> guildmirror_core::RunStats {
    cloner(host.clone(), options)
        .run(&LogSink)
        .await
        .expect("run completes")
}

#[tokio::test]
async fn fails_fast_when_source_is_unknown() {
    let host = MockHost::new();
    host.add_guild(TARGET, "target", None);

    let result = cloner(host.clone(), CloneOptions::default()).run(&LogSink).await;

    assert!(result.is_err());
    // No create/delete call may be issued before the precondition check.
    assert_eq!(host.mutation_count(), 0);
}

#[tokio::test]
async fn fails_fast_when_target_is_unknown() {
    let host = MockHost::new();
    host.add_guild(SOURCE, "source", None);

    let result = cloner(host.clone(), CloneOptions::default()).run(&LogSink).await;

    assert!(result.is_err());
    assert_eq!(host.mutation_count(), 0);
}

#[tokio::test]
async fn teardown_clears_deletable_entities_and_spares_protected_roles() {
    let host = MockHost::new();
    host.add_guild(SOURCE, "source", None);
    host.add_guild(TARGET, "target", None);

    host.guild(TARGET, |g| {
        g.channels.push(text_channel(50, "old-general", 0, None));
        g.categories.push(CategoryInfo {
            id: ChannelId(51),
            name: "old-category".to_string(),
            position: 0,
            overwrites: Vec::new(),
        });
        let mut everyone = role(60, "@everyone", 0);
        everyone.is_default = true;
        g.roles.push(everyone);
        let mut bot_role = role(61, "integration", 1);
        bot_role.managed = true;
        g.roles.push(bot_role);
        let mut above = role(62, "above-us", 3);
        above.editable = false;
        g.roles.push(above);
        g.roles.push(role(63, "deletable", 2));
    });

    let stats = run(&host, CloneOptions::default()).await;

    assert_eq!(*stats.failed(), 0);
    host.guild(TARGET, |g| {
        assert!(g.channels.is_empty());
        assert!(g.categories.is_empty());
        let names: Vec<_> = g.roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["@everyone", "integration", "above-us"]);
    });

    // Second run over the already-clean target deletes nothing further.
    let before = host.with_state(|s| {
        s.mutations
            .iter()
            .filter(|m| m.starts_with("delete_"))
            .count()
    });
    run(&host, CloneOptions::default()).await;
    let after = host.with_state(|s| {
        s.mutations
            .iter()
            .filter(|m| m.starts_with("delete_"))
            .count()
    });
    assert_eq!(before, after);
}

#[tokio::test]
async fn roles_are_created_ascending_then_repositioned_descending() {
    let host = MockHost::new();
    host.add_guild(SOURCE, "source", None);
    host.add_guild(TARGET, "target", None);

    host.guild(SOURCE, |g| {
        let mut everyone = role(9, "@everyone", 0);
        everyone.is_default = true;
        g.roles.push(everyone);
        g.roles.push(role(10, "admin", 3));
        g.roles.push(role(11, "mod", 1));
        g.roles.push(role(12, "member", 2));
    });

    let stats = run(&host, CloneOptions::default()).await;

    assert_eq!(*stats.roles_created(), 3);
    assert_eq!(*stats.failed(), 0);

    host.with_state(|s| {
        // The default role is never recreated.
        let created: Vec<_> = s.created_roles.iter().map(|(_, r)| r.name.as_str()).collect();
        assert_eq!(created, vec!["mod", "member", "admin"]);

        // Reposition pass walks descending source positions and targets
        // the freshly assigned ids.
        let positions: Vec<u16> = s.repositions.iter().map(|(_, p)| *p).collect();
        assert_eq!(positions, vec![3, 2, 1]);
        let created_ids: HashSet<RoleId> = s.created_roles.iter().map(|(id, _)| *id).collect();
        assert!(s.repositions.iter().all(|(id, _)| created_ids.contains(id)));
    });
}

#[tokio::test]
async fn channel_parent_resolves_through_category_map_or_falls_back_to_top_level() {
    let host = MockHost::new();
    host.add_guild(SOURCE, "source", None);
    host.add_guild(TARGET, "target", None);

    host.guild(SOURCE, |g| {
        g.categories.push(CategoryInfo {
            id: ChannelId(100),
            name: "keeps".to_string(),
            position: 0,
            overwrites: Vec::new(),
        });
        g.categories.push(CategoryInfo {
            id: ChannelId(101),
            name: "breaks".to_string(),
            position: 1,
            overwrites: Vec::new(),
        });
        g.channels.push(text_channel(110, "under-keeps", 0, Some(100)));
        g.channels.push(text_channel(111, "under-breaks", 1, Some(101)));
        g.channels.push(text_channel(112, "floating", 2, None));
    });
    host.with_state(|s| {
        s.fail_creates.insert("breaks".to_string());
    });

    let stats = run(&host, CloneOptions::default()).await;

    assert_eq!(*stats.categories_created(), 1);
    assert_eq!(*stats.channels_created(), 3);
    assert_eq!(*stats.failed(), 1);

    host.with_state(|s| {
        let kept_id = s
            .created_categories
            .iter()
            .find(|(_, c)| c.name == "keeps")
            .map(|(id, _)| *id)
            .expect("category created");
        let by_name: HashMap<&str, &NewChannel> = s
            .created_channels
            .iter()
            .map(|(_, c)| (c.name.as_str(), c))
            .collect();
        assert_eq!(by_name["under-keeps"].parent, Some(kept_id));
        // The channel whose parent failed to clone is created top-level,
        // not omitted.
        assert_eq!(by_name["under-breaks"].parent, None);
        assert_eq!(by_name["floating"].parent, None);
    });
}

#[tokio::test]
async fn role_overwrites_are_translated_on_categories_and_channels() {
    let host = MockHost::new();
    host.add_guild(SOURCE, "source", None);
    host.add_guild(TARGET, "target", None);

    host.guild(SOURCE, |g| {
        g.roles.push(role(10, "vip", 1));
        g.categories.push(CategoryInfo {
            id: ChannelId(100),
            name: "lounge".to_string(),
            position: 0,
            overwrites: vec![
                Overwrite {
                    subject: OverwriteSubject::Role(RoleId(10)),
                    allow: 0x400,
                    deny: 0x800,
                },
                Overwrite {
                    subject: OverwriteSubject::Member(UserId(42)),
                    allow: 0x1,
                    deny: 0x2,
                },
            ],
        });
        let mut channel = text_channel(110, "vip-chat", 0, Some(100));
        channel.overwrites = vec![Overwrite {
            subject: OverwriteSubject::Role(RoleId(10)),
            allow: 0x10,
            deny: 0x20,
        }];
        g.channels.push(channel);
    });

    run(&host, CloneOptions::default()).await;

    host.with_state(|s| {
        let new_vip = s
            .created_roles
            .iter()
            .find(|(_, r)| r.name == "vip")
            .map(|(id, _)| *id)
            .expect("vip cloned");

        let (_, lounge) = &s.created_categories[0];
        assert_eq!(lounge.overwrites[0].subject, OverwriteSubject::Role(new_vip));
        assert_eq!(lounge.overwrites[0].allow, 0x400);
        assert_eq!(lounge.overwrites[0].deny, 0x800);
        // Member subjects pass through untouched.
        assert_eq!(
            lounge.overwrites[1].subject,
            OverwriteSubject::Member(UserId(42))
        );

        let (_, chat) = &s.created_channels[0];
        assert_eq!(chat.overwrites[0].subject, OverwriteSubject::Role(new_vip));
    });
}

#[tokio::test]
async fn stats_account_for_partial_failures_without_aborting() {
    let host = MockHost::new();
    host.add_guild(SOURCE, "source", None);
    host.add_guild(TARGET, "target", None);

    host.guild(SOURCE, |g| {
        g.roles.push(role(10, "alpha", 1));
        g.roles.push(role(11, "beta", 2));
        g.roles.push(role(12, "gamma", 3));
        g.emojis.push(EmojiInfo {
            id: EmojiId(300),
            name: "party".to_string(),
            image_url: "https://cdn.test/party.png".to_string(),
        });
        g.emojis.push(EmojiInfo {
            id: EmojiId(301),
            name: "broken".to_string(),
            image_url: "https://cdn.test/broken.png".to_string(),
        });
    });
    host.with_state(|s| {
        s.fail_creates.insert("beta".to_string());
        s.fail_fetch.insert("https://cdn.test/broken.png".to_string());
    });

    let stats = run(&host, CloneOptions::default()).await;

    assert_eq!(*stats.roles_created(), 2);
    assert_eq!(*stats.emojis_created(), 1);
    // One failed role creation plus one failed emoji fetch.
    assert_eq!(*stats.failed(), 2);
    host.with_state(|s| assert_eq!(s.created_emojis, vec!["party"]));
}

#[tokio::test]
async fn rate_limited_creations_are_absorbed_and_still_succeed() {
    let host = MockHost::new();
    host.add_guild(SOURCE, "source", None);
    host.add_guild(TARGET, "target", None);

    host.guild(SOURCE, |g| {
        g.channels.push(text_channel(110, "busy", 0, None));
    });
    host.with_state(|s| {
        s.rate_limit_creates.insert("busy".to_string(), 2);
    });

    let sleeper = Arc::new(InstantSleeper::new());
    let stats = GuildCloner::new(host.clone(), SOURCE, TARGET, CloneOptions::default())
        .with_sleeper(sleeper.clone())
        .run(&LogSink)
        .await
        .expect("run completes");

    assert_eq!(*stats.channels_created(), 1);
    assert_eq!(*stats.failed(), 0);
    // Two backoff waits of the default 10 s policy were requested.
    let backoffs = sleeper
        .slept()
        .iter()
        .filter(|d| d.as_secs() == 10)
        .count();
    assert_eq!(backoffs, 2);
}

#[tokio::test]
async fn opting_out_skips_roles_and_emojis() {
    let host = MockHost::new();
    host.add_guild(SOURCE, "source", None);
    host.add_guild(TARGET, "target", None);

    host.guild(SOURCE, |g| {
        g.roles.push(role(10, "admin", 1));
        g.emojis.push(EmojiInfo {
            id: EmojiId(300),
            name: "party".to_string(),
            image_url: "https://cdn.test/party.png".to_string(),
        });
    });
    host.guild(TARGET, |g| {
        g.roles.push(role(20, "keep-me", 1));
    });

    let stats = run(&host, CloneOptions {
        clone_emojis: false,
        clone_roles: false,
    })
    .await;

    assert_eq!(*stats.roles_created(), 0);
    assert_eq!(*stats.emojis_created(), 0);
    host.guild(TARGET, |g| {
        // Existing roles survive when role cloning is off.
        assert_eq!(g.roles.len(), 1);
        assert_eq!(g.roles[0].name, "keep-me");
    });
    host.with_state(|s| {
        assert!(s.created_roles.is_empty());
        assert!(s.created_emojis.is_empty());
    });
}

#[tokio::test]
async fn profile_phase_copies_name_and_icon() {
    let host = MockHost::new();
    host.add_guild(SOURCE, "Source Server", Some("https://cdn.test/icon.png"));
    host.add_guild(TARGET, "target", None);

    let stats = run(&host, CloneOptions::default()).await;

    assert_eq!(*stats.failed(), 0);
    host.with_state(|s| {
        assert_eq!(s.set_names, vec!["Source Server"]);
        assert_eq!(s.set_icons, 1);
    });
    host.guild(TARGET, |g| assert_eq!(g.name, "Source Server"));
}

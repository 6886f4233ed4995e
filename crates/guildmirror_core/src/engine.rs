//! The clone orchestration engine.
//!
//! [`GuildCloner`] drives the six sequential phases of a clone run:
//! teardown, roles, categories, channels, emojis, profile. Phases execute
//! strictly in order; within a phase, entities are processed one at a
//! time, each wrapped by the rate-limit retry driver, with a fixed pause
//! between operations. Each successful creation updates the identity
//! mapping tables before the next dependent phase begins.
//!
//! Error policy: only a failed guild lookup escapes [`GuildCloner::run`].
//! Every per-entity failure is caught, tallied into [`RunStats`], and the
//! phase proceeds to the next entity. Role repositioning and mapping-table
//! misses are best-effort and not counted at all.

use crate::model::{
    ChannelId, ChannelInfo, EmojiInfo, GuildId, GuildProfile, NewCategory, NewChannel, RoleId,
    RoleInfo,
};
use crate::{GuildHost, IdMap, Phase, ProgressSink, RunStats, translate_overwrites};
use guildmirror_error::{DiscordResult, GuildMirrorResult};
use guildmirror_rate_limit::{Pacing, RetryPolicy, Sleeper, TokioSleeper, retry_rate_limited};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Operator-selected options for one clone run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloneOptions {
    /// Clone custom emojis (the slowest phase, due to upload spacing).
    pub clone_emojis: bool,
    /// Delete and recreate roles; when off, existing target roles are
    /// kept and role-subject overwrites pass through untranslated.
    pub clone_roles: bool,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            clone_emojis: true,
            clone_roles: true,
        }
    }
}

/// One guild clone run.
///
/// The cloner owns its identity mapping tables and statistics, so state is
/// provably scoped to a single run: [`GuildCloner::run`] consumes the
/// cloner and returns the final [`RunStats`]. Independent runs cannot
/// interfere.
///
/// # Example
///
/// ```rust,ignore
/// let cloner = GuildCloner::new(host, source_id, target_id, CloneOptions::default());
/// let stats = cloner.run(&LogSink).await?;
/// info!("clone finished: {stats}");
/// ```
pub struct GuildCloner<H> {
    host: H,
    source: GuildId,
    target: GuildId,
    options: CloneOptions,
    pacing: Pacing,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    role_map: IdMap<RoleId>,
    category_map: IdMap<ChannelId>,
    stats: RunStats,
}

impl<H: GuildHost> GuildCloner<H> {
    /// Create a cloner for one source/target pair.
    pub fn new(host: H, source: GuildId, target: GuildId, options: CloneOptions) -> Self {
        Self {
            host,
            source,
            target,
            options,
            pacing: Pacing::default(),
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            role_map: IdMap::new(),
            category_map: IdMap::new(),
            stats: RunStats::default(),
        }
    }

    /// Override the inter-operation pacing.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Override the rate-limit backoff policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Substitute the sleep provider (tests inject an instant sleeper).
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Execute the clone run to completion.
    ///
    /// Resolves both guilds first; a lookup failure aborts before any
    /// create or delete call is issued. After that, phases run
    /// unconditionally in sequence and the final statistics are returned
    /// no matter how many individual operations failed.
    ///
    /// # Errors
    ///
    /// Only the precondition lookups can fail the run (`GuildNotFound`).
    #[instrument(skip(self, progress), fields(source = %self.source, target = %self.target))]
    pub async fn run(mut self, progress: &dyn ProgressSink) -> GuildMirrorResult<RunStats> {
        let source = self.host.guild_profile(self.source).await?;
        let target = self.host.guild_profile(self.target).await?;
        info!(source = %source.name, target = %target.name, "starting clone run");
        progress
            .send(&format!("Cloning from: {} -> {}", source.name, target.name))
            .await;

        self.teardown(progress).await;

        if self.options.clone_roles {
            self.clone_roles(progress).await;
        } else {
            progress.send("Skipped role cloning.").await;
        }

        self.clone_categories(progress).await;
        self.clone_channels(progress).await;

        if self.options.clone_emojis {
            self.clone_emojis(progress).await;
        }

        self.apply_profile(&source, progress).await;

        info!(stats = %self.stats, "clone run complete");
        progress
            .send(&format!("Cloning statistics: {}", self.stats))
            .await;
        Ok(self.stats)
    }

    /// Phase 1: delete the target's channels, then (when roles are being
    /// cloned) its deletable roles. Never aborts the run.
    async fn teardown(&mut self, progress: &dyn ProgressSink) {
        progress.send("Deleting existing channels...").await;

        let channels = match self.host.all_channel_ids(self.target).await {
            Ok(channels) => channels,
            Err(err) => {
                warn!("failed to enumerate target channels: {err}");
                self.stats.absorb(Phase::Teardown, &[Err(err)]);
                return;
            }
        };

        let mut outcomes = Vec::with_capacity(channels.len());
        for channel in channels {
            let host = &self.host;
            let description = format!("delete channel {channel}");
            let outcome = retry_rate_limited(
                || host.delete_channel(channel),
                &description,
                &self.retry,
                self.sleeper.as_ref(),
            )
            .await;
            if let Err(err) = &outcome {
                warn!(%channel, "channel deletion failed: {err}");
            }
            outcomes.push(outcome);
            self.sleeper.sleep(self.pacing.teardown_pause()).await;
        }
        self.stats.absorb(Phase::Teardown, &outcomes);

        if !self.options.clone_roles {
            progress.send("Skipped deleting existing roles.").await;
            return;
        }

        progress.send("Deleting existing roles...").await;

        let roles = match self.host.roles(self.target).await {
            Ok(roles) => roles,
            Err(err) => {
                warn!("failed to enumerate target roles: {err}");
                self.stats.absorb(Phase::Teardown, &[Err(err)]);
                return;
            }
        };

        let mut outcomes = Vec::new();
        for role in roles
            .iter()
            .filter(|r| !r.is_default && !r.managed && r.editable)
        {
            let host = &self.host;
            let target = self.target;
            let description = format!("delete role {}", role.name);
            let outcome = retry_rate_limited(
                || host.delete_role(target, role.id),
                &description,
                &self.retry,
                self.sleeper.as_ref(),
            )
            .await;
            if let Err(err) = &outcome {
                warn!(role = %role.name, "role deletion failed: {err}");
            }
            outcomes.push(outcome);
            self.sleeper.sleep(self.pacing.teardown_pause()).await;
        }
        self.stats.absorb(Phase::Teardown, &outcomes);
    }

    /// Phase 2: create roles in ascending position order, recording each
    /// new id in the role map, then re-apply the source stacking order.
    async fn clone_roles(&mut self, progress: &dyn ProgressSink) {
        progress.send("Cloning roles...").await;

        let mut roles = match self.host.roles(self.source).await {
            Ok(roles) => roles,
            Err(err) => {
                warn!("failed to enumerate source roles: {err}");
                self.stats.absorb(Phase::Roles, &[Err(err)]);
                return;
            }
        };
        roles.retain(|r| !r.is_default);
        roles.sort_by_key(|r| r.position);

        let mut outcomes = Vec::with_capacity(roles.len());
        for role in &roles {
            let host = &self.host;
            let target = self.target;
            let payload = role.to_new_role();
            let description = format!("create role {}", role.name);
            match retry_rate_limited(
                || host.create_role(target, &payload),
                &description,
                &self.retry,
                self.sleeper.as_ref(),
            )
            .await
            {
                Ok(new_id) => {
                    debug!(role = %role.name, %new_id, "role created");
                    self.role_map.insert(role.id, new_id);
                    outcomes.push(Ok(()));
                }
                Err(err) => {
                    warn!(role = %role.name, "role creation failed: {err}");
                    progress
                        .send(&format!("Failed to create role {}: {err}", role.name))
                        .await;
                    outcomes.push(Err(err));
                }
            }
            self.sleeper.sleep(self.pacing.create_pause()).await;
        }
        self.stats.absorb(Phase::Roles, &outcomes);

        self.restack_roles(&roles).await;
    }

    /// Second pass of the roles phase: creation assigns positions
    /// incrementally, so a single ascending pass cannot reproduce the
    /// source stacking order. Walk the source roles in descending position
    /// order and move each corresponding target role into place.
    /// Best-effort: failures and map misses are skipped silently.
    async fn restack_roles(&self, roles: &[RoleInfo]) {
        let mut by_position: Vec<&RoleInfo> = roles.iter().collect();
        by_position.sort_by(|a, b| b.position.cmp(&a.position));

        for role in by_position {
            let Some(new_id) = self.role_map.get(role.id) else {
                continue;
            };
            let host = &self.host;
            let target = self.target;
            let description = format!("reposition role {}", role.name);
            if let Err(err) = retry_rate_limited(
                || host.set_role_position(target, new_id, role.position),
                &description,
                &self.retry,
                self.sleeper.as_ref(),
            )
            .await
            {
                debug!(role = %role.name, "role reposition skipped: {err}");
            }
            self.sleeper.sleep(self.pacing.teardown_pause()).await;
        }
    }

    /// Phase 3: create categories in ascending position order, recording
    /// each new id in the category map for parent resolution.
    async fn clone_categories(&mut self, progress: &dyn ProgressSink) {
        progress.send("Cloning categories...").await;

        let mut categories = match self.host.categories(self.source).await {
            Ok(categories) => categories,
            Err(err) => {
                warn!("failed to enumerate source categories: {err}");
                self.stats.absorb(Phase::Categories, &[Err(err)]);
                return;
            }
        };
        categories.sort_by_key(|c| c.position);

        let mut outcomes = Vec::with_capacity(categories.len());
        for category in &categories {
            let host = &self.host;
            let target = self.target;
            let payload = NewCategory {
                name: category.name.clone(),
                position: category.position,
                overwrites: translate_overwrites(&category.overwrites, &self.role_map),
            };
            let description = format!("create category {}", category.name);
            match retry_rate_limited(
                || host.create_category(target, &payload),
                &description,
                &self.retry,
                self.sleeper.as_ref(),
            )
            .await
            {
                Ok(new_id) => {
                    debug!(category = %category.name, %new_id, "category created");
                    self.category_map.insert(category.id, new_id);
                    outcomes.push(Ok(()));
                }
                Err(err) => {
                    warn!(category = %category.name, "category creation failed: {err}");
                    progress
                        .send(&format!(
                            "Failed to create category {}: {err}",
                            category.name
                        ))
                        .await;
                    outcomes.push(Err(err));
                }
            }
            self.sleeper.sleep(self.pacing.create_pause()).await;
        }
        self.stats.absorb(Phase::Categories, &outcomes);
    }

    /// Phase 4: create text and voice channels in ascending position
    /// order, resolving parents through the category map. A parent whose
    /// category failed to clone yields a top-level channel, not a failure.
    async fn clone_channels(&mut self, progress: &dyn ProgressSink) {
        progress.send("Cloning channels...").await;

        let mut channels = match self.host.channels(self.source).await {
            Ok(channels) => channels,
            Err(err) => {
                warn!("failed to enumerate source channels: {err}");
                self.stats.absorb(Phase::Channels, &[Err(err)]);
                return;
            }
        };
        channels.sort_by_key(|c| c.position);

        let mut outcomes = Vec::with_capacity(channels.len());
        for channel in &channels {
            let host = &self.host;
            let target = self.target;
            let payload = self.channel_payload(channel);
            let description = format!("create channel {}", channel.name);
            match retry_rate_limited(
                || host.create_channel(target, &payload),
                &description,
                &self.retry,
                self.sleeper.as_ref(),
            )
            .await
            {
                Ok(new_id) => {
                    debug!(channel = %channel.name, %new_id, "channel created");
                    outcomes.push(Ok(()));
                }
                Err(err) => {
                    warn!(channel = %channel.name, "channel creation failed: {err}");
                    progress
                        .send(&format!("Failed to create channel {}: {err}", channel.name))
                        .await;
                    outcomes.push(Err(err));
                }
            }
            self.sleeper.sleep(self.pacing.create_pause()).await;
        }
        self.stats.absorb(Phase::Channels, &outcomes);
    }

    /// Build the target-side creation payload for a source channel.
    fn channel_payload(&self, channel: &ChannelInfo) -> NewChannel {
        // A category-map miss means the parent failed to clone; the
        // channel is created top-level rather than dropped.
        let parent = channel.parent_id.and_then(|id| self.category_map.get(id));
        NewChannel {
            name: channel.name.clone(),
            kind: channel.kind,
            parent,
            position: channel.position,
            overwrites: translate_overwrites(&channel.overwrites, &self.role_map),
            topic: channel.topic.clone(),
            nsfw: channel.nsfw,
            slow_mode_secs: channel.slow_mode_secs,
            bitrate: channel.bitrate,
            user_limit: channel.user_limit,
        }
    }

    /// Phase 5: clone emojis by value. Each entity costs a download plus
    /// an upload; either failure counts once against the run.
    async fn clone_emojis(&mut self, progress: &dyn ProgressSink) {
        progress.send("Cloning emojis...").await;

        let emojis = match self.host.emojis(self.source).await {
            Ok(emojis) => emojis,
            Err(err) => {
                warn!("failed to enumerate source emojis: {err}");
                self.stats.absorb(Phase::Emojis, &[Err(err)]);
                return;
            }
        };

        let mut outcomes = Vec::with_capacity(emojis.len());
        for emoji in &emojis {
            let outcome = self.clone_one_emoji(emoji).await;
            if let Err(err) = &outcome {
                warn!(emoji = %emoji.name, "emoji clone failed: {err}");
                progress
                    .send(&format!("Failed to clone emoji {}: {err}", emoji.name))
                    .await;
            }
            outcomes.push(outcome);
            self.sleeper.sleep(self.pacing.emoji_pause()).await;
        }
        self.stats.absorb(Phase::Emojis, &outcomes);
    }

    async fn clone_one_emoji(&self, emoji: &EmojiInfo) -> DiscordResult<()> {
        let host = &self.host;
        let target = self.target;

        let fetch_description = format!("fetch emoji image {}", emoji.name);
        let image = retry_rate_limited(
            || host.fetch_image(&emoji.image_url),
            &fetch_description,
            &self.retry,
            self.sleeper.as_ref(),
        )
        .await?;

        let create_description = format!("create emoji {}", emoji.name);
        let new_id = retry_rate_limited(
            || host.create_emoji(target, &emoji.name, &image),
            &create_description,
            &self.retry,
            self.sleeper.as_ref(),
        )
        .await?;
        debug!(emoji = %emoji.name, %new_id, "emoji created");
        Ok(())
    }

    /// Phase 6: copy the source's display name and icon onto the target.
    async fn apply_profile(&mut self, source: &GuildProfile, progress: &dyn ProgressSink) {
        progress.send("Applying server name and icon...").await;

        let mut outcomes = Vec::new();

        {
            let host = &self.host;
            let target = self.target;
            let outcome = retry_rate_limited(
                || host.set_guild_name(target, &source.name),
                "set guild name",
                &self.retry,
                self.sleeper.as_ref(),
            )
            .await;
            if let Err(err) = &outcome {
                warn!("failed to set guild name: {err}");
            }
            outcomes.push(outcome);
        }

        if let Some(icon_url) = &source.icon_url {
            let outcome = self.apply_icon(icon_url).await;
            if let Err(err) = &outcome {
                warn!("failed to set guild icon: {err}");
            }
            outcomes.push(outcome);
        }

        self.stats.absorb(Phase::Profile, &outcomes);
    }

    async fn apply_icon(&self, icon_url: &str) -> DiscordResult<()> {
        let host = &self.host;
        let target = self.target;

        let image = retry_rate_limited(
            || host.fetch_image(icon_url),
            "fetch guild icon",
            &self.retry,
            self.sleeper.as_ref(),
        )
        .await?;

        retry_rate_limited(
            || host.set_guild_icon(target, &image),
            "set guild icon",
            &self.retry,
            self.sleeper.as_ref(),
        )
        .await
    }
}

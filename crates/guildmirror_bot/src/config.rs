//! Bot configuration loading.
//!
//! Layered sources, later entries taking precedence:
//! - Bundled defaults (include_str! from guildmirror.toml)
//! - User overrides (./guildmirror.toml)
//! - Environment variables (GUILDMIRROR__SECTION__KEY)
//!
//! The bot token is deliberately not part of the config file; it comes
//! from the `DISCORD_TOKEN` environment variable (a `.env` file works via
//! dotenvy).

use config::{Config, Environment, File, FileFormat};
use guildmirror_error::{ConfigError, GuildMirrorResult};
use guildmirror_rate_limit::{Pacing, RetryPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the GuildMirror bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Inter-operation pauses during a clone run.
    #[serde(default)]
    pub pacing: Pacing,
    /// Rate-limit backoff policy.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl MirrorConfig {
    /// Load configuration with precedence: env > current dir > bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a source fails to read or the
    /// merged result does not deserialize.
    pub fn load() -> GuildMirrorResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > bundled defaults");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../../../guildmirror.toml");

        let merged = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::with_name("guildmirror").required(false))
            .add_source(Environment::with_prefix("GUILDMIRROR").separator("__"))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {e}")))?;

        Ok(merged
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {e}")))?)
    }

    /// Read the bot token from the environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `DISCORD_TOKEN` is unset.
    pub fn token() -> GuildMirrorResult<String> {
        Ok(std::env::var("DISCORD_TOKEN")
            .map_err(|_| ConfigError::new("DISCORD_TOKEN is not set"))?)
    }
}

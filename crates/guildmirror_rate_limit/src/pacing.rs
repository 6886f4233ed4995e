//! Fixed inter-operation pauses.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_teardown_ms() -> u64 {
    100
}

fn default_create_ms() -> u64 {
    200
}

fn default_emoji_ms() -> u64 {
    2_000
}

/// Pauses inserted between consecutive entity operations.
///
/// These are empirically chosen rate-limit avoidance heuristics, not
/// published protocol numbers, so they are plain configuration values.
/// Emoji endpoints are the most aggressively limited, hence the much
/// larger spacing there.
///
/// # Example
///
/// ```toml
/// [pacing]
/// teardown_ms = 100
/// create_ms = 200
/// emoji_ms = 2000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    /// Pause after each delete during teardown, in milliseconds.
    #[serde(default = "default_teardown_ms")]
    pub teardown_ms: u64,
    /// Pause after each role/category/channel creation, in milliseconds.
    #[serde(default = "default_create_ms")]
    pub create_ms: u64,
    /// Pause after each emoji creation, in milliseconds.
    #[serde(default = "default_emoji_ms")]
    pub emoji_ms: u64,
}

impl Pacing {
    /// Pause after a teardown delete.
    pub fn teardown_pause(&self) -> Duration {
        Duration::from_millis(self.teardown_ms)
    }

    /// Pause after a role/category/channel creation.
    pub fn create_pause(&self) -> Duration {
        Duration::from_millis(self.create_ms)
    }

    /// Pause after an emoji creation.
    pub fn emoji_pause(&self) -> Duration {
        Duration::from_millis(self.emoji_ms)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            teardown_ms: default_teardown_ms(),
            create_ms: default_create_ms(),
            emoji_ms: default_emoji_ms(),
        }
    }
}

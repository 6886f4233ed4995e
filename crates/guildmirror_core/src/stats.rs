//! Run statistics and phase outcome accounting.

use derive_getters::Getters;
use guildmirror_error::DiscordResult;

/// The sequential phases of a clone run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Phase {
    /// Deletion of existing target channels and roles.
    #[display("teardown")]
    Teardown,
    /// Role creation and repositioning.
    #[display("roles")]
    Roles,
    /// Category creation.
    #[display("categories")]
    Categories,
    /// Channel creation.
    #[display("channels")]
    Channels,
    /// Emoji fetch and creation.
    #[display("emojis")]
    Emojis,
    /// Guild name and icon application.
    #[display("profile")]
    Profile,
}

/// Counters owned by a single clone run.
///
/// Each phase records its per-entity outcomes as an explicit result list
/// and feeds them through [`RunStats::absorb`]; successes bump the phase's
/// creation counter, failures bump `failed`. The run reports the final
/// tally regardless of how many individual operations failed.
///
/// # Example
///
/// ```
/// use guildmirror_core::{Phase, RunStats};
///
/// let mut stats = RunStats::default();
/// stats.absorb(Phase::Roles, &[Ok(()), Ok(())]);
/// assert_eq!(*stats.roles_created(), 2);
/// assert_eq!(*stats.failed(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct RunStats {
    /// Roles successfully created on the target.
    roles_created: u64,
    /// Categories successfully created on the target.
    categories_created: u64,
    /// Channels successfully created on the target.
    channels_created: u64,
    /// Emojis successfully created on the target.
    emojis_created: u64,
    /// Per-entity operations that failed with a non-rate-limit error.
    failed: u64,
}

impl RunStats {
    /// Fold a phase's per-entity outcomes into the counters.
    ///
    /// Teardown and profile successes have no creation counter; their
    /// failures still count.
    pub fn absorb(&mut self, phase: Phase, outcomes: &[DiscordResult<()>]) {
        for outcome in outcomes {
            match outcome {
                Ok(()) => match phase {
                    Phase::Roles => self.roles_created += 1,
                    Phase::Categories => self.categories_created += 1,
                    Phase::Channels => self.channels_created += 1,
                    Phase::Emojis => self.emojis_created += 1,
                    Phase::Teardown | Phase::Profile => {}
                },
                Err(_) => self.failed += 1,
            }
        }
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "roles: {}, categories: {}, channels: {}, emojis: {}, failed: {}",
            self.roles_created,
            self.categories_created,
            self.channels_created,
            self.emojis_created,
            self.failed
        )
    }
}

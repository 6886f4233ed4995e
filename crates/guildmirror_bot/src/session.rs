//! The `!clone` command and its confirmation dialogue.
//!
//! Cloning is destructive (the target is torn down first), so the command
//! walks the operator through a short confirmation dialogue before
//! anything runs. The dialogue state is pure data: the event handler owns
//! a `user -> PendingClone` table and feeds replies through
//! [`PendingClone::answer`].

use guildmirror_core::CloneOptions;
use guildmirror_core::model::GuildId;

/// First prompt, shown immediately after a valid `!clone` command.
pub const PROMPT_PROCEED: &str = "This will delete every channel and role in the target server \
     before copying. Continue? (y/n)";
/// Second prompt. Emoji uploads dominate run time on emoji-heavy guilds.
pub const PROMPT_EMOJIS: &str =
    "Clone emojis too? (y/n) Emoji uploads are heavily rate limited and can take a while.";
/// Third prompt. Answering no keeps the target's existing roles.
pub const PROMPT_ROLES: &str =
    "Clone roles too? (y/n) Answering no keeps the target server's existing roles.";
/// Reply sent when the operator backs out at the first prompt.
pub const CANCELLED: &str = "Clone cancelled.";

/// A fully confirmed clone order, ready to hand to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloneRequest {
    /// Guild to copy from.
    pub source: GuildId,
    /// Guild to copy onto.
    pub target: GuildId,
    /// Options collected from the dialogue.
    pub options: CloneOptions,
}

/// Parse a `!clone <source_id> <target_id>` command.
///
/// Returns `None` for anything else, including trailing junk.
pub fn parse_clone_command(content: &str) -> Option<(u64, u64)> {
    let mut words = content.split_whitespace();
    if words.next()? != "!clone" {
        return None;
    }
    let source = words.next()?.parse().ok()?;
    let target = words.next()?.parse().ok()?;
    if words.next().is_some() {
        return None;
    }
    Some((source, target))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Proceed,
    Emojis,
    Roles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Yes,
    No,
    Other,
}

fn parse_answer(content: &str) -> Answer {
    match content.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Answer::Yes,
        "n" | "no" => Answer::No,
        _ => Answer::Other,
    }
}

/// Dialogue state for one user's in-flight `!clone` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingClone {
    source: u64,
    target: u64,
    step: Step,
    clone_emojis: bool,
}

/// What the handler should do with the user's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep the dialogue open and send the next prompt.
    Prompt(PendingClone, &'static str),
    /// All confirmations collected; start the clone run.
    Launch(CloneRequest),
    /// The operator backed out; send the given reply.
    Cancelled(&'static str),
    /// The message was not a y/n answer; keep the dialogue as it was.
    Ignored(PendingClone),
}

impl PendingClone {
    /// Open a dialogue for a parsed `!clone` command, returning the state
    /// to store and the first prompt to send.
    pub fn new(source: u64, target: u64) -> (Self, &'static str) {
        (
            Self {
                source,
                target,
                step: Step::Proceed,
                clone_emojis: true,
            },
            PROMPT_PROCEED,
        )
    }

    /// Advance the dialogue with the user's reply.
    pub fn answer(self, content: &str) -> Outcome {
        let answer = parse_answer(content);
        if answer == Answer::Other {
            return Outcome::Ignored(self);
        }
        let yes = answer == Answer::Yes;
        match self.step {
            Step::Proceed if !yes => Outcome::Cancelled(CANCELLED),
            Step::Proceed => Outcome::Prompt(
                Self {
                    step: Step::Emojis,
                    ..self
                },
                PROMPT_EMOJIS,
            ),
            Step::Emojis => Outcome::Prompt(
                Self {
                    step: Step::Roles,
                    clone_emojis: yes,
                    ..self
                },
                PROMPT_ROLES,
            ),
            Step::Roles => Outcome::Launch(CloneRequest {
                source: GuildId(self.source),
                target: GuildId(self.target),
                options: CloneOptions {
                    clone_emojis: self.clone_emojis,
                    clone_roles: yes,
                },
            }),
        }
    }
}

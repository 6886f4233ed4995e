//! Interactive Discord front-end for GuildMirror.
//!
//! The bot listens for a `!clone <source_id> <target_id>` command, walks
//! the issuing user through a confirmation dialogue (teardown warning,
//! emoji opt-out, role opt-out), and then drives a clone run through the
//! engine in `guildmirror_core`, relaying progress lines back into the
//! channel the command came from.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bot;
mod config;
mod handler;
mod progress;
pub mod session;

pub use bot::MirrorBot;
pub use config::MirrorConfig;
pub use handler::MirrorHandler;
pub use progress::ChannelSink;

//! Serenity-backed guild host for the GuildMirror engine.
//!
//! This crate adapts the Discord REST API (via serenity's `Http` client)
//! to the [`GuildHost`](guildmirror_core::GuildHost) trait the engine
//! drives. It owns all serenity model handling: snapshot conversions,
//! creation builders, and the mapping of serenity errors onto the
//! workspace error taxonomy (in particular, recognizing HTTP 429 as the
//! transient rate-limit signal the retry wrapper absorbs).
//!
//! Image downloads for emoji and icon cloning go through a plain reqwest
//! client; the Discord CDN is a public HTTP endpoint, not part of the bot
//! API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod conversions;
mod fetch;

pub use client::DiscordHost;

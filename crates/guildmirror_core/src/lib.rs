//! Clone orchestration engine for GuildMirror.
//!
//! This crate contains the platform-independent heart of GuildMirror: the
//! sequenced pipeline that reproduces the structural configuration of a
//! source guild onto a target guild through create/delete operations
//! against a remote API.
//!
//! The interesting problem is identity remapping: every entity created on
//! the target receives a fresh id unrelated to its source counterpart, yet
//! later operations (permission overwrites, parent links, stacking order)
//! must reference the new ids consistently, using only mappings computed
//! during the run.
//!
//! # Architecture
//!
//! - **model**: snapshot and creation payload types read from / written to
//!   the remote API, with typed snowflake ids.
//! - **host**: the [`GuildHost`] trait abstracting the remote client; the
//!   engine never talks to a transport directly.
//! - **map**: run-scoped identity mapping tables (`old id -> new id`).
//! - **overwrites**: the pure permission-overwrite translator.
//! - **stats**: per-run counters and phase outcome accounting.
//! - **progress**: the human-readable progress line sink.
//! - **engine**: [`GuildCloner`], the six sequential phases (teardown,
//!   roles, categories, channels, emojis, profile).
//!
//! # Usage
//!
//! ```rust,ignore
//! use guildmirror_core::{CloneOptions, GuildCloner, LogSink, model::GuildId};
//!
//! let cloner = GuildCloner::new(host, GuildId(src), GuildId(tgt), CloneOptions::default());
//! let stats = cloner.run(&LogSink).await?;
//! println!("{stats}");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod host;
mod map;
pub mod model;
mod overwrites;
mod progress;
mod stats;

pub use engine::{CloneOptions, GuildCloner};
pub use host::GuildHost;
pub use map::IdMap;
pub use overwrites::translate_overwrites;
pub use progress::{LogSink, ProgressSink};
pub use stats::{Phase, RunStats};

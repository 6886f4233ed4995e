//! Error types for the GuildMirror toolkit.
//!
//! This crate provides the foundation error types used throughout the
//! GuildMirror workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use guildmirror_error::{GuildMirrorResult, HttpError};
//!
//! fn fetch_data() -> GuildMirrorResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! match fetch_data() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod discord;
mod error;
mod http;

pub use config::ConfigError;
pub use discord::{DiscordError, DiscordErrorKind, DiscordResult};
pub use error::{GuildMirrorError, GuildMirrorErrorKind, GuildMirrorResult};
pub use http::HttpError;

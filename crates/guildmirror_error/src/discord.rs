//! Discord-specific error types.
//!
//! This module provides error handling for Discord guild operations,
//! including API errors, rate-limit signals, and lookup failures. The
//! rate-limit classification here drives the retry wrapper in
//! `guildmirror_rate_limit`: a `RateLimited` error is transient and
//! retried with a fixed backoff, every other kind propagates.

use derive_getters::Getters;

/// Discord error variants.
///
/// Represents different error conditions that can occur while reading from
/// or writing to a guild.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum DiscordErrorKind {
    /// Guild (server) not found by ID, or not visible to the acting identity.
    #[display("Guild not found: {_0}")]
    GuildNotFound(u64),

    /// The remote signalled "too many requests"; clears after a backoff.
    #[display("Rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited {
        /// Server-suggested wait before retrying, when the response carried one.
        retry_after_secs: Option<f64>,
    },

    /// The acting identity lacks the permission for an operation.
    #[display("Insufficient permissions: {_0}")]
    PermissionDenied(String),

    /// Any other Discord API rejection.
    #[display("Discord API error: {_0}")]
    Api(String),

    /// Image download or encoding failed.
    #[display("Image fetch failed: {_0}")]
    ImageFetch(String),

    /// Connection to the Discord gateway failed.
    #[display("Connection failed: {_0}")]
    ConnectionFailed(String),

    /// Bot token is invalid or expired.
    #[display("Invalid or expired bot token")]
    InvalidToken,
}

impl DiscordErrorKind {
    /// Check whether this error is a transient rate-limit signal.
    ///
    /// Rate-limit errors are absorbed by the retry wrapper with an
    /// unbounded fixed backoff; everything else propagates to the caller.
    ///
    /// # Examples
    ///
    /// ```
    /// use guildmirror_error::DiscordErrorKind;
    ///
    /// let kind = DiscordErrorKind::RateLimited { retry_after_secs: Some(2.5) };
    /// assert!(kind.is_rate_limit());
    /// assert!(!DiscordErrorKind::InvalidToken.is_rate_limit());
    /// ```
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, DiscordErrorKind::RateLimited { .. })
    }
}

/// Discord error with source location tracking.
///
/// Captures the error kind along with the file and line where the error
/// occurred.
///
/// # Example
/// ```
/// use guildmirror_error::{DiscordError, DiscordErrorKind};
///
/// let err = DiscordError::new(DiscordErrorKind::GuildNotFound(42));
/// assert!(err.kind().is_rate_limit() == false);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, Getters)]
#[display("Discord Error: {} at line {} in {}", kind, line, file)]
pub struct DiscordError {
    kind: DiscordErrorKind,
    line: u32,
    file: &'static str,
}

impl DiscordError {
    /// Create a new DiscordError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DiscordErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Check whether the wrapped kind is a transient rate-limit signal.
    pub fn is_rate_limit(&self) -> bool {
        self.kind.is_rate_limit()
    }
}

impl From<DiscordErrorKind> for DiscordError {
    #[track_caller]
    fn from(kind: DiscordErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result type for Discord operations.
pub type DiscordResult<T> = Result<T, DiscordError>;

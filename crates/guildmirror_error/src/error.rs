//! Top-level error wrapper types.

use crate::{ConfigError, DiscordError, HttpError};

/// This is the foundation error enum. Each workspace crate routes its
/// errors through one of these variants.
///
/// # Examples
///
/// ```
/// use guildmirror_error::{GuildMirrorError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: GuildMirrorError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum GuildMirrorErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Discord guild operation error
    #[from(DiscordError)]
    Discord(DiscordError),
}

/// GuildMirror error with kind discrimination.
///
/// # Examples
///
/// ```
/// use guildmirror_error::{GuildMirrorResult, ConfigError};
///
/// fn might_fail() -> GuildMirrorResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("GuildMirror Error: {}", _0)]
pub struct GuildMirrorError(Box<GuildMirrorErrorKind>);

impl GuildMirrorError {
    /// Create a new error from a kind.
    pub fn new(kind: GuildMirrorErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GuildMirrorErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to GuildMirrorErrorKind
impl<T> From<T> for GuildMirrorError
where
    T: Into<GuildMirrorErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for GuildMirror operations.
///
/// # Examples
///
/// ```
/// use guildmirror_error::{GuildMirrorResult, HttpError};
///
/// fn fetch_data() -> GuildMirrorResult<String> {
///     Err(HttpError::new("404 Not Found"))?
/// }
/// ```
pub type GuildMirrorResult<T> = std::result::Result<T, GuildMirrorError>;

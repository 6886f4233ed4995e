//! Image downloads from the Discord CDN.

use guildmirror_core::model::Image;
use guildmirror_error::{DiscordError, DiscordErrorKind, DiscordResult};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

/// Download an image, keeping the MIME type the server reported.
///
/// Emoji and icon uploads are sent back to Discord as data URIs, so the
/// MIME type must survive the round trip. A missing content-type header
/// falls back to `image/png`, the CDN's dominant format.
pub(crate) async fn fetch_image(client: &reqwest::Client, url: &str) -> DiscordResult<Image> {
    let response = client.get(url).send().await.map_err(|e| {
        DiscordError::new(DiscordErrorKind::ImageFetch(format!(
            "request to {url} failed: {e}"
        )))
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(DiscordError::new(DiscordErrorKind::ImageFetch(format!(
            "{url} returned {status}"
        ))));
    }

    let mime = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("image/png")
        .to_string();

    let data = response
        .bytes()
        .await
        .map_err(|e| {
            DiscordError::new(DiscordErrorKind::ImageFetch(format!(
                "reading body of {url} failed: {e}"
            )))
        })?
        .to_vec();

    debug!(url, mime, bytes = data.len(), "image downloaded");
    Ok(Image { data, mime })
}

use super::PlaybackDescriptor;
use secrecy::ExposeSecret;

/// URL that opens `descriptor` in the companion player page.
///
/// External links are returned verbatim. Streams become query parameters
/// on `player_page`. Key material travels in the clear.
///
/// ```
/// use coursenav::media::{player_url, PlaybackDescriptor};
///
/// let live = PlaybackDescriptor::LiveStream { url: "https://s/x.m3u8".into() };
/// assert_eq!(
///     player_url("https://player.example/pwplayer.html", &live),
///     "https://player.example/pwplayer.html?type=live&url=https%3A%2F%2Fs%2Fx.m3u8"
/// );
/// ```
pub fn player_url(player_page: &str, descriptor: &PlaybackDescriptor) -> String {
    let query = match descriptor {
        PlaybackDescriptor::ExternalLink { url } => return url.clone(),
        PlaybackDescriptor::LiveStream { url } => {
            format!("type=live&url={}", urlencoding::encode(url))
        }
        PlaybackDescriptor::DrmStream {
            url,
            key_id,
            key,
            pssh,
        } => {
            let mut query = format!(
                "type=drm&url={}&keyid={}&key={}",
                urlencoding::encode(url),
                urlencoding::encode(key_id),
                urlencoding::encode(key.expose_secret())
            );
            if let Some(pssh) = pssh {
                query.push_str("&pssh=");
                query.push_str(&urlencoding::encode(pssh));
            }
            query
        }
    };

    let separator = if player_page.contains('?') { '&' } else { '?' };
    format!("{}{}{}", player_page, separator, query)
}

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// How a resolved item should be played.
pub enum PlaybackDescriptor {
    /// Open verbatim (PDF, YouTube).
    ExternalLink { url: String },
    /// Unencrypted stream.
    LiveStream { url: String },
    /// Encrypted stream with one content key.
    DrmStream {
        url: String,
        key_id: String,
        key: SecretString,
        pssh: Option<String>,
    },
}

impl PlaybackDescriptor {
    pub fn url(&self) -> &str {
        match self {
            PlaybackDescriptor::ExternalLink { url }
            | PlaybackDescriptor::LiveStream { url }
            | PlaybackDescriptor::DrmStream { url, .. } => url,
        }
    }

    /// Short name for logs and the status bar.
    pub fn kind(&self) -> &'static str {
        match self {
            PlaybackDescriptor::ExternalLink { .. } => "external",
            PlaybackDescriptor::LiveStream { .. } => "live",
            PlaybackDescriptor::DrmStream { .. } => "drm",
        }
    }
}

/// Key material is masked so descriptors can be logged.
impl fmt::Debug for PlaybackDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackDescriptor::ExternalLink { url } => {
                f.debug_struct("ExternalLink").field("url", url).finish()
            }
            PlaybackDescriptor::LiveStream { url } => {
                f.debug_struct("LiveStream").field("url", url).finish()
            }
            PlaybackDescriptor::DrmStream {
                url, key_id, pssh, ..
            } => f
                .debug_struct("DrmStream")
                .field("url", url)
                .field("key_id", key_id)
                .field("key", &"[REDACTED]")
                .field("pssh", pssh)
                .finish(),
        }
    }
}

impl PartialEq for PlaybackDescriptor {
    fn eq(&self, other: &Self) -> bool {
        use PlaybackDescriptor::*;
        match (self, other) {
            (ExternalLink { url: a }, ExternalLink { url: b }) => a == b,
            (LiveStream { url: a }, LiveStream { url: b }) => a == b,
            (
                DrmStream {
                    url: a_url,
                    key_id: a_kid,
                    key: a_key,
                    pssh: a_pssh,
                },
                DrmStream {
                    url: b_url,
                    key_id: b_kid,
                    key: b_key,
                    pssh: b_pssh,
                },
            ) => {
                a_url == b_url
                    && a_kid == b_kid
                    && a_key.expose_secret() == b_key.expose_secret()
                    && a_pssh == b_pssh
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_masks_key() {
        let descriptor = PlaybackDescriptor::DrmStream {
            url: "https://s/x.mpd".to_string(),
            key_id: "kid123".to_string(),
            key: SecretString::from("deadbeef".to_string()),
            pssh: None,
        };
        let out = format!("{:?}", descriptor);
        assert!(!out.contains("deadbeef"));
        assert!(out.contains("[REDACTED]"));
        assert!(out.contains("kid123"));
    }

    #[test]
    fn test_equality_compares_key() {
        let make = |key: &str| PlaybackDescriptor::DrmStream {
            url: "u".to_string(),
            key_id: "k".to_string(),
            key: SecretString::from(key.to_string()),
            pssh: None,
        };
        assert_eq!(make("aa"), make("aa"));
        assert_ne!(make("aa"), make("bb"));
        assert_ne!(
            make("aa"),
            PlaybackDescriptor::LiveStream {
                url: "u".to_string()
            }
        );
    }
}

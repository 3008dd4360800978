use super::PlaybackDescriptor;
use crate::api::{ApiError, CatalogClient};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

/// Host markers for links that play outside the app.
const EXTERNAL_HOST_MARKERS: &[&str] = &["youtube.com", "youtu.be"];

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Media lookup failed: {0}")]
    Lookup(#[from] ApiError),
    #[error("Unsupported video format")]
    Unsupported,
    /// First DRM key entry is not `keyid:key`.
    #[error("Malformed DRM key entry: {0}")]
    MalformedKey(&'static str),
    #[error("Resolution task failed: {0}")]
    Task(String),
}

impl ResolveError {
    /// Message shown to the user in the alert dialog.
    pub fn user_message(&self) -> &'static str {
        match self {
            ResolveError::Unsupported => "Unsupported video format.",
            ResolveError::Lookup(_) | ResolveError::MalformedKey(_) | ResolveError::Task(_) => {
                "Failed to load video."
            }
        }
    }
}

/// Object form of a media-lookup answer.
#[derive(Debug, Deserialize)]
struct MediaObject {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    keys: Option<Vec<String>>,
    #[serde(default)]
    pssh: Option<String>,
}

/// True when `url` is played outside the app without a lookup.
pub fn is_external_link(url: &str) -> bool {
    url.ends_with(".pdf") || EXTERNAL_HOST_MARKERS.iter().any(|m| url.contains(m))
}

/// Decode a media-lookup body into a playback descriptor.
///
/// Order matters: a bare string is a live stream; an object with a `url` and
/// no `keys` is a live stream; an object with a `url` and at least one key is
/// a DRM stream built from the first key. Anything else is unsupported.
pub fn decode_media_response(body: serde_json::Value) -> Result<PlaybackDescriptor, ResolveError> {
    let obj = match body {
        serde_json::Value::String(url) if !url.is_empty() => {
            return Ok(PlaybackDescriptor::LiveStream { url });
        }
        serde_json::Value::Object(map) => {
            serde_json::from_value::<MediaObject>(serde_json::Value::Object(map)).map_err(|e| {
                tracing::debug!(error = %e, "Media object has unexpected field types");
                ResolveError::Unsupported
            })?
        }
        other => {
            tracing::debug!(shape = %json_kind(&other), "Unsupported media response");
            return Err(ResolveError::Unsupported);
        }
    };

    let url = obj.url.filter(|u| !u.is_empty()).ok_or(ResolveError::Unsupported)?;
    match obj.keys {
        None => Ok(PlaybackDescriptor::LiveStream { url }),
        Some(keys) => {
            let first = keys.into_iter().next().ok_or(ResolveError::Unsupported)?;
            let (key_id, key) = split_key_entry(&first)?;
            Ok(PlaybackDescriptor::DrmStream {
                url,
                key_id,
                key,
                pssh: obj.pssh.filter(|p| !p.is_empty()),
            })
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "empty string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn split_key_entry(entry: &str) -> Result<(String, SecretString), ResolveError> {
    let (key_id, key) = entry
        .split_once(':')
        .ok_or(ResolveError::MalformedKey("missing ':' separator"))?;
    if key_id.is_empty() || key.is_empty() {
        return Err(ResolveError::MalformedKey("empty key id or key"));
    }
    if key.contains(':') {
        return Err(ResolveError::MalformedKey("more than one ':' separator"));
    }
    Ok((key_id.to_string(), SecretString::from(key.to_string())))
}

/// Turns opaque content URLs into playback descriptors.
#[derive(Debug, Clone)]
pub struct MediaResolver {
    client: CatalogClient,
}

impl MediaResolver {
    pub fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    /// Resolve `url`, calling the lookup endpoint unless it is an external
    /// link.
    pub async fn resolve(&self, url: &str) -> Result<PlaybackDescriptor, ResolveError> {
        if is_external_link(url) {
            tracing::debug!(url = %url, "External link, skipping lookup");
            return Ok(PlaybackDescriptor::ExternalLink {
                url: url.to_string(),
            });
        }

        let body = self.client.lookup_media(url).await?;
        let descriptor = decode_media_response(body)?;
        tracing::info!(kind = descriptor.kind(), "Resolved media");
        Ok(descriptor)
    }
}

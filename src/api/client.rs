use super::{CatalogNode, MediaItem};
use crate::nav::{resolve_tab_path, Tab};
use crate::util::validate_base_url;
use futures::StreamExt;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default cap on a single response body (8MB).
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const BATCHES_PATH: &str = "/api/pw/batches";
const TODAY_CLASS_PATH: &str = "/api/pw/todayclass";
const VIDEO_PATH: &str = "/api/pw/video";

/// Errors from talking to the catalog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Body was not the JSON shape we expected
    #[error("Malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Insecure API base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

impl ApiError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(e)
        }
    }
}

/// Transport tuning for [`CatalogClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub max_response_bytes: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

/// Limit redirects to 3 hops and refuse loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

/// Typed client for the catalog API.
///
/// Cheap to clone: the connection pool and base URL are shared.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base: Arc<str>,
    max_response_bytes: usize,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base", &self.base)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

impl CatalogClient {
    /// Build a client for `base_url`.
    ///
    /// The base must be HTTPS; plain HTTP is accepted only for localhost.
    pub fn new(base_url: &str, options: ClientOptions) -> Result<Self, ApiError> {
        let parsed = validate_base_url(base_url).map_err(|e| match e {
            crate::util::UrlValidationError::Insecure => ApiError::InsecureBaseUrl,
            other => ApiError::InvalidBaseUrl(other.to_string()),
        })?;
        if parsed.scheme() == "http" {
            tracing::warn!(base_url = %base_url, "Using non-HTTPS API base URL (localhost only)");
        }

        let http = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .user_agent(concat!("coursenav/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            http,
            base: Arc::from(base_url.trim_end_matches('/')),
            max_response_bytes: options.max_response_bytes,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// Join a catalog-relative path (with query) onto the API base.
    ///
    /// Absolute `http(s)` URLs are returned unchanged.
    pub fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base, path)
        } else {
            format!("{}/{}", self.base, path)
        }
    }

    pub async fn list_batches(&self) -> Result<Vec<CatalogNode>, ApiError> {
        self.get_list(&self.absolute(BATCHES_PATH)).await
    }

    pub async fn list_subjects(&self, batch_url: &str) -> Result<Vec<CatalogNode>, ApiError> {
        self.get_list(&self.absolute(batch_url)).await
    }

    pub async fn list_chapters(&self, subject_url: &str) -> Result<Vec<CatalogNode>, ApiError> {
        self.get_list(&self.absolute(subject_url)).await
    }

    pub async fn list_today_classes(&self, batch_id: &str) -> Result<Vec<MediaItem>, ApiError> {
        let url = format!(
            "{}?batchId={}",
            self.absolute(TODAY_CLASS_PATH),
            urlencoding::encode(batch_id)
        );
        self.get_list(&url).await
    }

    /// List one content tab of a chapter, given the lecture chapter id.
    pub async fn list_content(&self, tab: Tab, chapter_id: &str) -> Result<Vec<MediaItem>, ApiError> {
        let path = resolve_tab_path(chapter_id, tab);
        let url = format!(
            "{}?chapterId={}",
            self.absolute(tab.endpoint()),
            urlencoding::encode(&path)
        );
        self.get_list(&url).await
    }

    /// Raw body of the media-lookup endpoint for an opaque content URL.
    pub async fn lookup_media(&self, content_url: &str) -> Result<serde_json::Value, ApiError> {
        let url = format!(
            "{}?url={}",
            self.absolute(VIDEO_PATH),
            urlencoding::encode(content_url)
        );
        self.get_json(&url).await
    }

    /// Fetch a JSON list; a `null` body counts as empty.
    async fn get_list<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, ApiError> {
        let items: Option<Vec<T>> = self.get_json(url).await?;
        Ok(items.unwrap_or_default())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        tracing::debug!(url = %url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "Non-success status");
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        let body = read_limited_bytes(response, self.max_response_bytes).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

async fn read_limited_bytes(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::from_reqwest)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

/// Batch id for the today's-classes endpoint.
///
/// Takes whatever follows the first `=` in the raw batch URL (up to the next
/// `&`) and percent-decodes it. `None` when there is no `=` or nothing after
/// it.
pub fn batch_id_from_url(raw_batch_url: &str) -> Option<String> {
    let (_, rest) = raw_batch_url.split_once('=')?;
    let raw = rest.split('&').next().unwrap_or(rest);
    if raw.is_empty() {
        return None;
    }
    match urlencoding::decode(raw) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(e) => {
            tracing::debug!(raw, error = %e, "Batch id is not valid UTF-8 after decoding");
            None
        }
    }
}

//! Configuration file parser for ~/.config/coursenav/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as likely typos.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Catalog API used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "https://pw-api-75332756c41b.herokuapp.com";

/// Environment variable that overrides the configured API base.
pub const API_BASE_ENV: &str = "COURSENAV_API_BASE";

/// Player page path relative to the API base.
const PLAYER_PAGE_PATH: &str = "/pwplayer.html";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog API base URL. `None` means the built-in default.
    pub api_base: Option<String>,

    /// Companion player page. `None` means `{api_base}/pwplayer.html`.
    pub player_page: Option<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted response body size in bytes.
    pub max_response_bytes: usize,

    /// Write logs here instead of stderr.
    pub log_file: Option<PathBuf>,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,

    /// Problems found while loading, reported once logging is up.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: None,
            player_page: None,
            request_timeout_secs: crate::api::DEFAULT_TIMEOUT.as_secs(),
            max_response_bytes: crate::api::DEFAULT_MAX_RESPONSE_BYTES,
            log_file: None,
            keybindings: HashMap::new(),
            warnings: Vec::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "api_base",
        "player_page",
        "request_timeout_secs",
        "max_response_bytes",
        "log_file",
        "keybindings",
    ];

    /// Default location, `~/.config/coursenav/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("coursenav")
                .join("config.toml")
        })
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, listed in `warnings`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            // Deleted between metadata and read
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        let mut config: Config = toml::from_str(&content)?;
        if let Ok(raw) = content.parse::<toml::Table>() {
            config.warnings = raw
                .keys()
                .filter(|key| !Self::KNOWN_KEYS.contains(&key.as_str()))
                .map(|key| format!("Unknown key '{}' in config file, ignoring", key))
                .collect();
        }
        tracing::info!(
            path = %path.display(),
            api_base = ?config.api_base,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Effective API base: CLI flag, then environment, then config file, then
    /// the built-in default. A trailing `/` is dropped.
    pub fn resolve_api_base(&self, cli: Option<&str>, env: Option<&str>) -> String {
        let base = [cli, env, self.api_base.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_API_BASE);
        base.trim().trim_end_matches('/').to_string()
    }

    /// Effective player page: CLI flag, then config file, then
    /// `{api_base}/pwplayer.html`.
    pub fn resolve_player_page(&self, cli: Option<&str>, api_base: &str) -> String {
        [cli, self.player_page.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| format!("{}{}", api_base, PLAYER_PAGE_PATH))
    }

    pub fn client_options(&self) -> crate::api::ClientOptions {
        crate::api::ClientOptions {
            timeout: std::time::Duration::from_secs(self.request_timeout_secs.max(1)),
            max_response_bytes: self.max_response_bytes,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("coursenav_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_base.is_none());
        assert!(config.player_page.is_none());
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_response_bytes, 8 * 1024 * 1024);
        assert!(config.log_file.is_none());
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/coursenav_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert!(config.api_base.is_none());
    }

    #[test]
    fn test_empty_file_returns_default() {
        let (dir, path) = write_config("empty", "   \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
api_base = "https://catalog.example.com"
player_page = "https://player.example.com/play.html"
request_timeout_secs = 10
max_response_bytes = 1024
log_file = "/tmp/coursenav.log"

[keybindings]
quit = "Ctrl+q"
reload = "F5"
"#;
        let (dir, path) = write_config("full", content);

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.api_base.as_deref(),
            Some("https://catalog.example.com")
        );
        assert_eq!(
            config.player_page.as_deref(),
            Some("https://player.example.com/play.html")
        );
        assert_eq!(config.request_timeout_secs, 10);
        assert!(config.warnings.is_empty());
        assert_eq!(config.max_response_bytes, 1024);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/coursenav.log")));
        assert_eq!(
            config.keybindings.get("reload").map(String::as_str),
            Some("F5")
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config(
            "unknown",
            "api_base = \"https://a.example\"\ntheme = \"dark\"\n",
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_base.as_deref(), Some("https://a.example"));
        assert_eq!(config.warnings.len(), 1);
        assert!(config.warnings[0].contains("'theme'"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("wrongtype", "request_timeout_secs = \"soon\"\n");
        assert!(Config::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_api_base_precedence() {
        let config = Config {
            api_base: Some("https://from-config.example".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_api_base(Some("https://cli.example/"), Some("https://env.example")),
            "https://cli.example"
        );
        assert_eq!(
            config.resolve_api_base(None, Some("https://env.example")),
            "https://env.example"
        );
        assert_eq!(
            config.resolve_api_base(None, None),
            "https://from-config.example"
        );
        assert_eq!(
            Config::default().resolve_api_base(None, None),
            DEFAULT_API_BASE
        );
    }

    #[test]
    fn test_blank_source_falls_through_to_next() {
        let config = Config {
            api_base: Some("https://from-config.example".to_string()),
            player_page: Some("https://p.example/x.html".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_api_base(None, Some("")),
            "https://from-config.example"
        );
        assert_eq!(
            config.resolve_api_base(Some("  "), Some("https://env.example")),
            "https://env.example"
        );
        assert_eq!(
            config.resolve_player_page(Some(""), "https://api.example"),
            "https://p.example/x.html"
        );
    }

    #[test]
    fn test_player_page_defaults_to_api_base() {
        let config = Config::default();
        assert_eq!(
            config.resolve_player_page(None, "https://api.example"),
            "https://api.example/pwplayer.html"
        );
        assert_eq!(
            config.resolve_player_page(Some("https://p.example/x.html"), "https://api.example"),
            "https://p.example/x.html"
        );
    }

    #[test]
    fn test_client_options_floor_timeout() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.client_options().timeout.as_secs(), 1);
    }
}

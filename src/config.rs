//! Client configuration and the layered settings it is built from.

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-attempt timeout used when none is configured.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Total attempt budget used when none is configured.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Backend address used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Immutable settings of one client instance.
///
/// Built once with the `with_*` methods and then moved into the client;
/// there are no setters afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    api_token: Option<String>,
    timeout_ms: u64,
    max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the total number of attempts per operation. Zero is raised to one.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

/// Optional values from one configuration layer (file, environment or flags).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

impl Settings {
    /// Default location of the settings file: `<config_dir>/folioai/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("folioai").join("config.json"))
    }

    /// Loads settings from `path`, or from [`Settings::default_path`] when `None`.
    ///
    /// An explicitly given file must exist; a missing default file yields empty settings.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self> {
        debug!("Reading settings from {:?}...", path);
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {:?}", path))
    }

    /// Layers `other` on top of `self`; values present in `other` win.
    pub fn merge(self, other: Settings) -> Settings {
        Settings {
            api_url: other.api_url.or(self.api_url),
            token: other.token.or(self.token),
            timeout_ms: other.timeout_ms.or(self.timeout_ms),
            max_retries: other.max_retries.or(self.max_retries),
        }
    }

    pub fn into_client_config(self) -> ClientConfig {
        let mut config = ClientConfig::new(self.api_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
            .with_timeout_ms(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
            .with_max_retries(self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES));
        if let Some(token) = self.token {
            debug!("Using API token for authentication: {}", mask_token(&token));
            config = config.with_api_token(token);
        }
        config
    }
}

/// Shortens a secret for log output, keeping a few characters at each end.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_ms(), 30_000);
        assert_eq!(config.max_retries(), 2);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert!(config.api_token().is_none());
    }

    #[test]
    fn test_zero_retries_normalised() {
        let config = ClientConfig::default().with_max_retries(0);
        assert_eq!(config.max_retries(), 1);
    }

    #[test]
    fn test_trailing_slash_trimmed_from_base_url() {
        let config = ClientConfig::new("http://api.test/");
        assert_eq!(config.base_url(), "http://api.test");
    }

    #[test]
    fn test_merge_prefers_later_layer() {
        let file = Settings {
            api_url: Some("http://file".to_string()),
            token: Some("file-token".to_string()),
            timeout_ms: Some(1000),
            max_retries: None,
        };
        let flags = Settings {
            api_url: Some("http://flag".to_string()),
            max_retries: Some(5),
            ..Settings::default()
        };

        let merged = file.merge(flags);
        assert_eq!(merged.api_url.as_deref(), Some("http://flag"));
        assert_eq!(merged.token.as_deref(), Some("file-token"));
        assert_eq!(merged.timeout_ms, Some(1000));
        assert_eq!(merged.max_retries, Some(5));
    }

    #[test]
    fn test_into_client_config() {
        let config = Settings {
            api_url: Some("http://api.test".to_string()),
            token: Some("secret-token-value".to_string()),
            timeout_ms: Some(5000),
            max_retries: Some(3),
        }
        .into_client_config();

        assert_eq!(config.base_url(), "http://api.test");
        assert_eq!(config.api_token(), Some("secret-token-value"));
        assert_eq!(config.timeout(), Duration::from_millis(5000));
        assert_eq!(config.max_retries(), 3);
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_url": "http://from-file", "max_retries": 4}}"#).unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.api_url.as_deref(), Some("http://from-file"));
        assert_eq!(settings.max_retries, Some(4));
        assert!(settings.token.is_none());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load(Some(&dir.path().join("nope.json")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"apiUrl": "http://typo"}}"#).unwrap();
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "*********");
        assert_eq!(mask_token("abcd1234567890wxyz"), "abcd*********wxyz");
    }
}

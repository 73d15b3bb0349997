//! Client configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! backend base URL, path-prefix proxy rules, request timeout and which
//! token store backend to use.
//!
//! Configuration is stored at `~/.config/chatsheet/config.json` and can be
//! overridden with `CHATSHEET_*` environment variables.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

/// Application name used for config directory paths and the keychain service
pub const APP_NAME: &str = "chatsheet";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend origin used when nothing else is configured
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// HTTP request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_BASE_URL: &str = "CHATSHEET_BASE_URL";
const ENV_TOKEN_STORE: &str = "CHATSHEET_TOKEN_STORE";
const ENV_TIMEOUT_SECS: &str = "CHATSHEET_TIMEOUT_SECS";

/// Where the bearer token is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    #[default]
    File,
    Keyring,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "file" => Ok(StoreKind::File),
            "keyring" | "keychain" => Ok(StoreKind::Keyring),
            other => Err(anyhow::anyhow!(
                "Unknown token store '{}' (expected memory, file or keyring)",
                other
            )),
        }
    }
}

/// Send requests under `prefix` to `target` instead of the base URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRule {
    pub prefix: String,
    pub target: String,
}

impl ProxyRule {
    pub fn new(prefix: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            target: target.into(),
        }
    }

    /// Prefix match on whole path segments: `/api` matches `/api` and
    /// `/api/unipile` but not `/apix`.
    fn matches(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub proxy: Vec<ProxyRule>,
    pub token_store: StoreKind,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy: Vec::new(),
            token_store: StoreKind::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `CHATSHEET_*` overrides using the given variable lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(kind) = lookup(ENV_TOKEN_STORE).filter(|v| !v.is_empty()) {
            self.token_store = kind
                .parse()
                .with_context(|| format!("Invalid {}", ENV_TOKEN_STORE))?;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).filter(|v| !v.is_empty()) {
            self.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: '{}'", ENV_TIMEOUT_SECS, secs))?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve a request path to a full URL.
    /// The first matching proxy rule wins; otherwise the base URL is used.
    pub fn url_for(&self, path: &str) -> String {
        let origin = self
            .proxy
            .iter()
            .find(|rule| rule.matches(path))
            .map(|rule| rule.target.as_str())
            .unwrap_or(self.base_url.as_str());
        format!("{}{}", origin.trim_end_matches('/'), path)
    }

    /// Open the configured token store backend
    pub fn open_store(&self) -> Result<Arc<dyn TokenStore>> {
        let store: Arc<dyn TokenStore> = match self.token_store {
            StoreKind::Memory => Arc::new(MemoryTokenStore::new()),
            StoreKind::File => Arc::new(FileTokenStore::open_default()?),
            StoreKind::Keyring => Arc::new(KeyringTokenStore::new()),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_url_for_uses_base_url_without_rules() {
        let config = Config {
            base_url: "http://backend.test/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.url_for("/auth/login"), "http://backend.test/auth/login");
    }

    #[test]
    fn test_url_for_routes_by_prefix() {
        let config = Config {
            base_url: "http://localhost:5173".to_string(),
            proxy: vec![ProxyRule::new("/api", "http://localhost:8080")],
            ..Config::default()
        };
        assert_eq!(
            config.url_for("/api/unipile"),
            "http://localhost:8080/api/unipile"
        );
        assert_eq!(config.url_for("/api"), "http://localhost:8080/api");
        assert_eq!(
            config.url_for("/auth/login"),
            "http://localhost:5173/auth/login"
        );
        // Whole segments only
        assert_eq!(config.url_for("/apix"), "http://localhost:5173/apix");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let config = Config {
            proxy: vec![
                ProxyRule::new("/api/unipile", "http://unipile.test"),
                ProxyRule::new("/api", "http://api.test"),
            ],
            ..Config::default()
        };
        assert_eq!(
            config.url_for("/api/unipile/linkedin/basic"),
            "http://unipile.test/api/unipile/linkedin/basic"
        );
        assert_eq!(config.url_for("/api/other"), "http://api.test/api/other");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_BASE_URL, "https://chatsheet.example"),
            (ENV_TOKEN_STORE, "Keyring"),
            (ENV_TIMEOUT_SECS, "5"),
        ]);
        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.base_url, "https://chatsheet.example");
        assert_eq!(config.token_store, StoreKind::Keyring);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_override_is_an_error() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == ENV_TOKEN_STORE).then(|| "floppy".to_string())
        });
        assert!(result.is_err());

        let result = config.apply_overrides(|key| {
            (key == ENV_TIMEOUT_SECS).then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token_store, StoreKind::File);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(APP_NAME).join(CONFIG_FILE);
        let config = Config {
            base_url: "http://backend.test".to_string(),
            proxy: vec![ProxyRule::new("/api", "http://localhost:8080")],
            token_store: StoreKind::Memory,
            timeout_secs: 10,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_url, config.base_url);
        assert_eq!(loaded.proxy, config.proxy);
        assert_eq!(loaded.token_store, StoreKind::Memory);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"token_store": "memory"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.token_store, StoreKind::Memory);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}

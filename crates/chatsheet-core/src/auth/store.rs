use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::config::APP_NAME;

/// Key under which the bearer token is persisted
pub const TOKEN_KEY: &str = "authToken";

/// Token file name in config directory
const TOKEN_FILE: &str = "token.json";

/// A single-slot store for the bearer token.
///
/// Implementations must be safe to share between concurrent requests.
/// Writes are last-write-wins.
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any
    fn get(&self) -> Option<String>;

    /// Persist a token. `None` or an empty string removes the stored value.
    fn set(&self, value: Option<&str>) -> Result<()>;

    /// Remove the stored token
    fn clear(&self) -> Result<()> {
        self.set(None)
    }
}

/// Treat empty strings the same as an absent token
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// In-memory
// ============================================================================

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a token
    pub fn with_token(token: impl Into<String>) -> Self {
        let token: String = token.into();
        let store = Self::new();
        *lock(&store.token) = Some(token).filter(|t| !t.is_empty());
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        lock(&self.token).clone()
    }

    fn set(&self, value: Option<&str>) -> Result<()> {
        *lock(&self.token) = non_empty(value).map(str::to_string);
        Ok(())
    }
}

// ============================================================================
// File-backed
// ============================================================================

/// Stores the token as `{"authToken": "<value>"}` in a JSON file.
///
/// The file is removed entirely once the token is cleared.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Open the store at `~/.config/chatsheet/token.json`
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(TOKEN_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read token file {}", self.path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse token file {}", self.path.display()))
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        match self.read_entries() {
            Ok(mut entries) => entries.remove(TOKEN_KEY).filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable token file");
                None
            }
        }
    }

    fn set(&self, value: Option<&str>) -> Result<()> {
        let _guard = lock(&self.write_lock);

        match non_empty(value) {
            Some(token) => {
                if let Some(parent) = self.path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let mut entries = BTreeMap::new();
                entries.insert(TOKEN_KEY.to_string(), token.to_string());
                let contents = serde_json::to_string_pretty(&entries)?;
                write_private(&self.path, contents.as_bytes()).with_context(|| {
                    format!("Failed to write token file {}", self.path.display())
                })?;
                debug!(path = %self.path.display(), "Token saved");
            }
            None => {
                if self.path.exists() {
                    std::fs::remove_file(&self.path).with_context(|| {
                        format!("Failed to remove token file {}", self.path.display())
                    })?;
                    debug!(path = %self.path.display(), "Token file removed");
                }
            }
        }
        Ok(())
    }
}

/// Write a file readable only by the current user
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        let mut file = options.open(path)?;
        // mode() only applies on creation
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        file.write_all(contents)
    }
    #[cfg(not(unix))]
    {
        options.open(path)?.write_all(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(), None);

        store.set(Some("abc")).unwrap();
        assert_eq!(store.get().as_deref(), Some("abc"));

        // Overwrite is last-write-wins
        store.set(Some("def")).unwrap();
        assert_eq!(store.get().as_deref(), Some("def"));
    }

    #[test]
    fn test_memory_store_empty_or_none_clears() {
        let store = MemoryTokenStore::with_token("abc");
        store.set(Some("")).unwrap();
        assert_eq!(store.get(), None);

        let store = MemoryTokenStore::with_token("abc");
        store.set(None).unwrap();
        assert_eq!(store.get(), None);

        let store = MemoryTokenStore::with_token("abc");
        store.clear().unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_memory_store_with_empty_token_is_anonymous() {
        let store = MemoryTokenStore::with_token("");
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(TOKEN_FILE);

        FileTokenStore::new(&path).set(Some("xyz")).unwrap();

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get().as_deref(), Some("xyz"));

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed[TOKEN_KEY], "xyz");
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_FILE);
        let store = FileTokenStore::new(&path);

        store.set(Some("xyz")).unwrap();
        assert!(path.exists());

        store.set(Some("")).unwrap();
        assert!(!path.exists());
        assert_eq!(store.get(), None);

        // Clearing an already-empty store is a no-op
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_FILE);

        // A pre-existing world-readable file is tightened on write
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        FileTokenStore::new(&path).set(Some("secret")).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let fresh = dir.path().join("fresh.json");
        FileTokenStore::new(&fresh).set(Some("secret")).unwrap();
        let mode = std::fs::metadata(&fresh).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_corrupt_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_FILE);
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(&path);
        assert_eq!(store.get(), None);

        // A fresh write replaces the corrupt file
        store.set(Some("abc")).unwrap();
        assert_eq!(store.get().as_deref(), Some("abc"));
    }
}

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::debug;

use super::store::{non_empty, TokenStore, TOKEN_KEY};
use crate::config::APP_NAME;

/// Token store backed by the OS keychain
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    service_name: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(APP_NAME)
    }

    /// Use a custom keychain service name
    pub fn with_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service_name, TOKEN_KEY).context("Failed to create keyring entry")
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self) -> Option<String> {
        let entry = match self.entry() {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Keyring unavailable");
                return None;
            }
        };
        match entry.get_password() {
            Ok(token) if !token.is_empty() => Some(token),
            Ok(_) | Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                debug!(error = %e, "Failed to read token from keychain");
                None
            }
        }
    }

    fn set(&self, value: Option<&str>) -> Result<()> {
        let entry = self.entry()?;
        match non_empty(value) {
            Some(token) => {
                entry
                    .set_password(token)
                    .context("Failed to store token in keychain")?;

                // Read back through a fresh entry: some backends accept the
                // write without persisting it anywhere.
                match self.entry()?.get_password() {
                    Ok(stored) if stored == token => Ok(()),
                    Ok(_) | Err(keyring::Error::NoEntry) => Err(anyhow::anyhow!(
                        "OS keychain did not retain the token; use the file token store instead"
                    )),
                    Err(e) => Err(e).context("Failed to verify token in keychain"),
                }
            }
            None => match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(e).context("Failed to delete token from keychain"),
            },
        }
    }
}

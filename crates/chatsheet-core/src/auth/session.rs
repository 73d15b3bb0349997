use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::store::TokenStore;

/// Observable authentication state, derived from the token store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::Anonymous => write!(f, "anonymous"),
            AuthState::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Shared handle to the token store.
/// Clone is cheap - all clones observe the same slot.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// Get the bearer token if one is stored
    pub fn token(&self) -> Option<String> {
        self.store.get()
    }

    pub fn state(&self) -> AuthState {
        match self.token() {
            Some(_) => AuthState::Authenticated,
            None => AuthState::Anonymous,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == AuthState::Authenticated
    }

    /// Store a token received from a successful login
    pub fn establish(&self, token: &str) -> Result<()> {
        self.store.set(Some(token))?;
        info!(state = %self.state(), "Session established");
        Ok(())
    }

    /// Forget the stored token
    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the token itself
        f.debug_struct("Session")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    #[test]
    fn test_state_transitions() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        assert_eq!(session.state(), AuthState::Anonymous);

        session.establish("xyz").unwrap();
        assert_eq!(session.state(), AuthState::Authenticated);
        assert_eq!(session.token().as_deref(), Some("xyz"));

        session.clear().unwrap();
        assert_eq!(session.state(), AuthState::Anonymous);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clones_share_store() {
        let session = Session::new(Arc::new(MemoryTokenStore::new()));
        let other = session.clone();

        session.establish("abc").unwrap();
        assert!(other.is_authenticated());

        other.clear().unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_debug_hides_token() {
        let session = Session::new(Arc::new(MemoryTokenStore::with_token("secret")));
        let printed = format!("{:?}", session);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("Authenticated"));
    }
}

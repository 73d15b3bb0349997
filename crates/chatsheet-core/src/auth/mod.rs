//! Authentication module for holding the bearer token.
//!
//! This module provides:
//! - `TokenStore`: a single-slot token store with in-memory, file and
//!   OS keychain backends
//! - `Session`: a shared handle over the store exposing the
//!   Anonymous/Authenticated state
//!
//! Tokens never expire client-side. They are cleared on logout or when
//! the server answers 401.

pub mod keychain;
pub mod session;
pub mod store;

pub use keychain::KeyringTokenStore;
pub use session::{AuthState, Session};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};

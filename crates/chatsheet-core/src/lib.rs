//! Client library for the chatsheet backend.
//!
//! Wires a reqwest client with bearer token injection and 401-triggered
//! session invalidation, and wraps the backend's auth and LinkedIn linking
//! endpoints.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthState, Session, TokenStore};
pub use config::Config;

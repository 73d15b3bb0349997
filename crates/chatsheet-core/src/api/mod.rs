//! REST API client module for the chatsheet backend.
//!
//! This module provides the `ApiClient` for logging in, signing up and
//! linking LinkedIn accounts, and the middleware `Pipeline` every request
//! runs through.
//!
//! The backend uses JWT bearer token authentication. The token obtained
//! from `/auth/login` is attached to every request and dropped as soon as
//! the backend answers 401.

pub mod client;
pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod unipile;

pub use client::ApiClient;
pub use error::ApiError;
pub use middleware::{BearerAuth, InvalidateOnUnauthorized, Middleware, RequestTrace};
pub use pipeline::Pipeline;

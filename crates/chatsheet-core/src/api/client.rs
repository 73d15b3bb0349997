//! API client for the chatsheet backend.
//!
//! This module provides the `ApiClient` struct. Every request goes through
//! the authenticated [`Pipeline`], so callers never handle the bearer token
//! directly.

use std::sync::Arc;

use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

use super::{ApiError, Pipeline};
use crate::auth::{AuthState, Session, TokenStore};
use crate::config::Config;
use crate::models::{Credentials, LoginResponse, SignupResponse};

// ============================================================================
// Endpoints
// ============================================================================

const LOGIN_PATH: &str = "/auth/login";
const SIGNUP_PATH: &str = "/auth/signup";

/// API client for the chatsheet backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    pipeline: Pipeline,
    session: Session,
    config: Arc<Config>,
}

impl ApiClient {
    /// Create a new API client around the given token store
    pub fn new(config: Config, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let session = Session::new(store);

        Ok(Self {
            pipeline: Pipeline::authenticated(client, session.clone()),
            session,
            config: Arc::new(config),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth_state(&self) -> AuthState {
        self.session.state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub(crate) async fn send(&self, method: Method, path: &str) -> Result<Response, ApiError> {
        let url = self.config.url_for(path);
        let builder = self.pipeline.client().request(method, url);
        self.pipeline.execute(builder).await
    }

    pub(crate) async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        let url = self.config.url_for(path);
        let builder = self.pipeline.client().request(method, url).json(body);
        self.pipeline.execute(builder).await
    }

    /// Read the full body and decode it as JSON
    pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let url = response.url().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path).await?;
        Self::decode(response).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send_json(Method::POST, path, body).await?;
        Self::decode(response).await
    }

    // ===== Account =====

    /// Log in and store the returned token
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response: LoginResponse = self
            .post(LOGIN_PATH, &Credentials { email, password })
            .await?;

        match response.token() {
            Some(token) => match self.session.establish(token) {
                Ok(()) => info!("Logged in"),
                Err(e) => warn!(error = %e, "Login succeeded but the token could not be stored"),
            },
            None => warn!("Login response carried no token"),
        }

        Ok(response)
    }

    /// Create a new account. Does not log in.
    pub async fn signup(&self, email: &str, password: &str) -> Result<SignupResponse, ApiError> {
        self.post(SIGNUP_PATH, &Credentials { email, password })
            .await
    }

    /// Forget the stored token. No request is sent.
    pub fn logout(&self) -> anyhow::Result<()> {
        self.session.clear()?;
        info!("Logged out");
        Ok(())
    }
}

//! Request/response hooks run by the [`Pipeline`](super::Pipeline).
//!
//! Outbound hooks see the fully built request before it is sent.
//! Inbound hooks see the result after non-2xx statuses have been turned
//! into [`ApiError`]s. Both return the value they were given unless they
//! have a reason to change it.

use reqwest::header::{self, HeaderValue};
use reqwest::{Request, Response};
use tracing::{debug, error, warn};

use super::ApiError;
use crate::auth::Session;

pub trait Middleware: Send + Sync {
    /// Runs before the request is sent
    fn on_request(&self, request: Request) -> Result<Request, ApiError> {
        Ok(request)
    }

    /// Runs after the response (or transport error) is received
    fn on_response(&self, result: Result<Response, ApiError>) -> Result<Response, ApiError> {
        result
    }
}

/// Attaches `Authorization: Bearer <token>` when a token is stored.
pub struct BearerAuth {
    session: Session,
}

impl BearerAuth {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

impl Middleware for BearerAuth {
    fn on_request(&self, mut request: Request) -> Result<Request, ApiError> {
        if let Some(token) = self.session.token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidCredential)?;
            value.set_sensitive(true);
            request.headers_mut().insert(header::AUTHORIZATION, value);
        }
        Ok(request)
    }
}

/// Clears the stored token when the server answers 401.
/// The error itself is passed on untouched.
pub struct InvalidateOnUnauthorized {
    session: Session,
}

impl InvalidateOnUnauthorized {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

impl Middleware for InvalidateOnUnauthorized {
    fn on_response(&self, result: Result<Response, ApiError>) -> Result<Response, ApiError> {
        if let Err(ref e) = result {
            if e.is_unauthorized() {
                if let Err(store_err) = self.session.clear() {
                    warn!(error = %store_err, "Failed to clear token after 401");
                }
                // TODO: surface a re-login prompt to callers once they can subscribe to session changes
                error!("401 Unauthorized, token cleared");
            }
        }
        result
    }
}

/// Debug-level log line for every request. Header values are never logged.
pub struct RequestTrace;

impl Middleware for RequestTrace {
    fn on_request(&self, request: Request) -> Result<Request, ApiError> {
        debug!(method = %request.method(), url = %request.url(), "Sending request");
        Ok(request)
    }

    fn on_response(&self, result: Result<Response, ApiError>) -> Result<Response, ApiError> {
        match &result {
            Ok(response) => {
                debug!(status = %response.status(), url = %response.url(), "Received response")
            }
            Err(e) => debug!(error = %e, "Request failed"),
        }
        result
    }
}

use std::sync::Arc;

use reqwest::{Client, Request, RequestBuilder, Response};

use super::middleware::{BearerAuth, InvalidateOnUnauthorized, Middleware, RequestTrace};
use super::ApiError;
use crate::auth::Session;

/// Sends requests through an ordered list of middleware.
///
/// Outbound hooks run in registration order before the request is sent,
/// inbound hooks run in registration order once the result is known.
/// Clone is cheap - the client and hooks are shared.
#[derive(Clone)]
pub struct Pipeline {
    client: Client,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            middleware: Vec::new(),
        }
    }

    /// The standard stack: tracing, bearer auth, 401 invalidation
    pub fn authenticated(client: Client, session: Session) -> Self {
        Self::new(client)
            .with(RequestTrace)
            .with(BearerAuth::new(session.clone()))
            .with(InvalidateOnUnauthorized::new(session))
    }

    /// Append a middleware to the end of the chain
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send a request through the middleware chain
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder.build()?;
        let request = self.outbound(request)?;

        let result = match self.client.execute(request).await {
            Ok(response) => Self::check_response(response).await,
            Err(e) => Err(ApiError::from(e)),
        };

        self.inbound(result)
    }

    fn outbound(&self, request: Request) -> Result<Request, ApiError> {
        self.middleware
            .iter()
            .try_fold(request, |request, m| m.on_request(request))
    }

    fn inbound(&self, result: Result<Response, ApiError>) -> Result<Response, ApiError> {
        self.middleware
            .iter()
            .fold(result, |result, m| m.on_response(result))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

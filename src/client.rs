//! Api Client
//!
//! The request pipeline applied to every outgoing request and incoming
//! response, in order:
//!
//! 1. Credential injection - `Authorization: Bearer <token>` when a
//!    session token exists, no header otherwise
//! 2. Content negotiation - `Content-Type: application/json` when no
//!    content type is set
//! 3. Response classification - non-success statuses become [`AuthError`]
//!    values; a 401 additionally tears the session down and redirects to
//!    the login view before the error reaches the caller
//!
//! This is the only component allowed to force a logout as a side effect
//! of an I/O failure. Every other error path returns a value and mutates
//! nothing.

use std::sync::Arc;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;

use crate::config::Config;
use crate::error::AuthError;
use crate::guard::{routes, Navigator};
use crate::session::SessionManager;

/// HTTP client carrying the session credential
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionManager>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a client against the configured server
    pub fn new(
        config: &Config,
        session: Arc<SessionManager>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: config.server_url().to_string(),
            session,
            navigator,
        }
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a GET request
    pub async fn get(&self, path: &str) -> Result<Response, AuthError> {
        self.execute(self.builder(Method::GET, path)).await
    }

    /// Send a DELETE request
    pub async fn delete(&self, path: &str) -> Result<Response, AuthError> {
        self.execute(self.builder(Method::DELETE, path)).await
    }

    /// Send a POST request with a JSON body
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, AuthError> {
        self.execute(self.builder(Method::POST, path).json(body)).await
    }

    /// Send a PUT request with a JSON body
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, AuthError> {
        self.execute(self.builder(Method::PUT, path).json(body)).await
    }

    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, AuthError> {
        let builder = match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let mut request = builder
            .build()
            .map_err(|e| AuthError::network(e.to_string()))?;
        let headers = request.headers_mut();
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| AuthError::network(e.to_string()))?;

        self.classify(response)
    }

    // Sole reclassification point for transport failures. On 401 the
    // teardown and redirect run before the error is surfaced, so the
    // redirect happens even when the caller drops the result.
    fn classify(&self, response: Response) -> Result<Response, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("authentication expired, clearing session");
            self.session.logout();
            self.navigator.navigate(routes::LOGIN);
            return Err(AuthError::SessionExpired);
        }

        let err =
            AuthError::from_status(status.as_u16(), status.canonical_reason().unwrap_or_default());
        tracing::warn!("request failed with {}: {}", status, err);
        Err(err)
    }
}

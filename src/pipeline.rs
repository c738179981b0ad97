//! Authenticated request pipeline.
//!
//! ARCHITECTURE
//! ============
//! Every backend call goes through [`ApiClient::send`]:
//! 1. Read the session token from the cookie store and, if present, attach
//!    it as a bearer `Authorization` header. The jar's cookies ride along
//!    in a `Cookie` header, as a browser would send them.
//! 2. Send. Transport failures (connect, timeout) become `ApiError`.
//! 3. On 401/403, delete the stored token as soon as the status line
//!    arrives, before the body is read. No redirect happens here; the route
//!    guard sees the purged credential on the next navigation.
//!
//! Responses of every status are returned as-is; [`ApiResponse::into_result`]
//! turns non-2xx into errors for callers that want that.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::cookie_store::{CookieStore, SESSION_COOKIE};
use crate::error::{ApiError, is_authorization_failure};

/// Request body variants used by the backend.
#[derive(Debug, Clone)]
pub enum Payload {
    Empty,
    Json(Value),
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(&'static str, String)>),
}

/// A response of any status with its body decoded.
///
/// Bodies that are not JSON are kept as a JSON string; empty bodies are `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Server-provided `message` field, when present and non-blank.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.trim().is_empty())
    }

    /// The body for 2xx responses, an [`ApiError`] otherwise.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for 401/403 and `Status` for other non-2xx codes.
    pub fn into_result(self) -> Result<Value, ApiError> {
        if self.is_success() {
            return Ok(self.body);
        }
        let message = self.message().unwrap_or_default().to_owned();
        Err(ApiError::from_status(self.status, message))
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CookieStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client for `config.base_url` backed by `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, store: Arc<dyn CookieStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;
        Ok(Self { http, base_url: config.base_url.clone(), store })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn CookieStore> {
        &self.store
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send one request through the pipeline.
    ///
    /// # Errors
    ///
    /// Returns `Timeout`/`Transport` when no response was received. HTTP error
    /// statuses are not errors at this level.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload: Payload,
    ) -> Result<ApiResponse, ApiError> {
        let mut request = self.http.request(method.clone(), self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }

        let cookies = self.store.header();
        if !cookies.is_empty() {
            request = request.header(COOKIE, cookies);
        }
        if let Some(token) = self.store.session_token() {
            request = request.bearer_auth(token);
        }

        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(&body),
            Payload::Form(fields) => request.form(&fields),
        };

        let response = request.send().await?;
        let status = response.status();

        if is_authorization_failure(status) {
            self.store.delete(SESSION_COOKIE);
            tracing::warn!(%method, path, status = status.as_u16(), "authorization failure; stored credential discarded");
        } else {
            tracing::debug!(%method, path, status = status.as_u16(), "api response");
        }

        let text = response.text().await?;
        Ok(ApiResponse { status, body: decode_body(&text) })
    }

    /// Send and require a 2xx status.
    ///
    /// # Errors
    ///
    /// Transport failures plus every non-2xx status, see [`ApiResponse::into_result`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload: Payload,
    ) -> Result<Value, ApiError> {
        self.send(method, path, query, payload).await?.into_result()
    }

    /// `GET path?query`, requiring success.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        self.request(Method::GET, path, query, Payload::Empty).await
    }
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
